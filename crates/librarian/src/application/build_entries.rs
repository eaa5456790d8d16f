//! BuildEntriesUseCase: turns the catalogue library into declared entries.
//!
//! Each [`RomEntry`] is resolved against its launcher:
//!
//! | Field            | Source                                              |
//! |------------------|-----------------------------------------------------|
//! | `exe`            | launcher executable                                 |
//! | `start_dir`      | parent directory of the launcher executable         |
//! | `launch_options` | launcher arguments, then the quoted ROM path        |
//! | `id_key`         | ROM path, or the executable when there is none      |
//! | `category`       | the category the entry is listed under              |
//!
//! Categories are visited in name order and entries in listed order, so the
//! output order is stable between runs.

use std::path::Path;

use librarian_core::domain::shortcut::quoted;
use librarian_core::{Category, DeclaredEntry, Library, RomEntry};
use thiserror::Error;

/// Error type for building declared entries.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    /// The entry (or its category default) names a launcher that is not defined.
    #[error("entry {entry:?} in category {category:?} uses unknown launcher {launcher:?}")]
    UnknownLauncher {
        category: String,
        entry: String,
        launcher: String,
    },

    /// Neither the entry nor its category names a launcher.
    #[error("entry {entry:?} in category {category:?} has no launcher")]
    NoLauncher { category: String, entry: String },
}

/// Builds the declared entries for every catalogue entry.
///
/// # Errors
///
/// Returns [`BuildError::UnknownLauncher`] or [`BuildError::NoLauncher`] for
/// the first entry whose launcher cannot be resolved.
pub fn build_entries(library: &Library) -> Result<Vec<DeclaredEntry>, BuildError> {
    let mut declared = Vec::with_capacity(library.entry_count());
    for (category_name, category) in &library.categories {
        for entry in &category.entries {
            declared.push(build_entry(library, category_name, category, entry)?);
        }
    }
    Ok(declared)
}

fn build_entry(
    library: &Library,
    category_name: &str,
    category: &Category,
    entry: &RomEntry,
) -> Result<DeclaredEntry, BuildError> {
    let launcher_name =
        library
            .launcher_name(category, entry)
            .ok_or_else(|| BuildError::NoLauncher {
                category: category_name.to_string(),
                entry: entry.name.clone(),
            })?;
    let launcher = library
        .launchers
        .get(launcher_name)
        .ok_or_else(|| BuildError::UnknownLauncher {
            category: category_name.to_string(),
            entry: entry.name.clone(),
            launcher: launcher_name.to_string(),
        })?;

    let mut options: Vec<String> = launcher.arguments.clone();
    if let Some(path) = &entry.path {
        options.push(quoted(path));
    }
    let launch_options = (!options.is_empty()).then(|| options.join(" "));

    let start_dir = Path::new(&launcher.executable)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(DeclaredEntry {
        name: entry.name.clone(),
        id_key: entry
            .path
            .clone()
            .unwrap_or_else(|| launcher.executable.clone()),
        exe: launcher.executable.clone(),
        start_dir,
        launch_options,
        icon: entry.icon.clone(),
        category: category_name.to_string(),
        open_vr: launcher.open_vr,
        last_play_time: entry.last_play_time,
    })
}
