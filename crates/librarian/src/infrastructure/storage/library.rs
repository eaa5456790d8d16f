//! JSON persistence for the catalogue library.
//!
//! The library file is hand-edited by the user and rewritten by the
//! librarian after every successful pass (to store the updated pointers and
//! shortcut IDs), so it is always written pretty-printed.

use std::path::{Path, PathBuf};

use librarian_core::Library;
use thiserror::Error;
use tracing::info;

/// Error type for library file operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The library file does not exist.
    #[error("library {path} not found (run `init` to create an example)")]
    NotFound { path: PathBuf },

    #[error("I/O error accessing library at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse library {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize library: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Loads the library at `path` and re-derives every entry's shortcut ID.
///
/// # Errors
///
/// Returns [`LibraryError::NotFound`] if the file is missing,
/// [`LibraryError::Io`] for other read failures and [`LibraryError::Parse`]
/// for malformed JSON.
pub fn load_library(path: &Path) -> Result<Library, LibraryError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LibraryError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LibraryError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let mut library: Library =
        serde_json::from_str(&content).map_err(|source| LibraryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    library.refresh_app_ids();
    Ok(library)
}

/// Writes `library` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`LibraryError::Io`] or [`LibraryError::Serialize`].
pub fn save_library(path: &Path, library: &Library) -> Result<(), LibraryError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| LibraryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let mut content = serde_json::to_string_pretty(library)?;
    content.push('\n');
    std::fs::write(path, content).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the example library to `path` unless a file is already there.
///
/// Returns `true` if the example was written.
///
/// # Errors
///
/// Returns [`LibraryError::Io`] or [`LibraryError::Serialize`].
pub fn write_example_library(path: &Path) -> Result<bool, LibraryError> {
    if path.exists() {
        return Ok(false);
    }
    save_library(path, &Library::example())?;
    info!("wrote example library to {}", path.display());
    Ok(true)
}
