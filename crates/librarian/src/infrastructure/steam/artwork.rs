//! Installs catalogue artwork into Steam's grid directory.
//!
//! Steam picks custom artwork up by file name:
//!
//! | Kind     | File name          |
//! |----------|--------------------|
//! | grid     | `<id>.<ext>`       |
//! | poster   | `<id>p.<ext>`      |
//! | hero     | `<id>_hero.<ext>`  |
//! | logo     | `<id>_logo.<ext>`  |
//! | icon     | `<id>_icon.<ext>`  |
//!
//! where `<id>` is the shortcut ID in decimal.

use std::path::{Path, PathBuf};

use librarian_core::{Library, RomEntry};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for artwork installation.
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("failed to create grid directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The artwork slots Steam recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkKind {
    Grid,
    Poster,
    Hero,
    Logo,
    Icon,
}

impl ArtworkKind {
    pub const ALL: [ArtworkKind; 5] = [
        ArtworkKind::Grid,
        ArtworkKind::Poster,
        ArtworkKind::Hero,
        ArtworkKind::Logo,
        ArtworkKind::Icon,
    ];

    fn suffix(self) -> &'static str {
        match self {
            ArtworkKind::Grid => "",
            ArtworkKind::Poster => "p",
            ArtworkKind::Hero => "_hero",
            ArtworkKind::Logo => "_logo",
            ArtworkKind::Icon => "_icon",
        }
    }

    fn source(self, entry: &RomEntry) -> Option<&str> {
        match self {
            ArtworkKind::Grid => entry.grid.as_deref(),
            ArtworkKind::Poster => entry.poster.as_deref(),
            ArtworkKind::Hero => entry.hero.as_deref(),
            ArtworkKind::Logo => entry.logo.as_deref(),
            ArtworkKind::Icon => entry.icon.as_deref(),
        }
    }

    /// File name Steam expects for this kind, keeping the source's extension.
    pub fn file_name(self, shortcut_id: u32, source: &Path) -> String {
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "png".to_string());
        format!("{shortcut_id}{}.{ext}", self.suffix())
    }
}

/// What an artwork pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArtworkReport {
    pub installed: Vec<PathBuf>,
    /// Source images that did not exist.
    pub missing: Vec<PathBuf>,
}

/// Copies every entry's artwork into `grid_dir`.
///
/// Entries without a shortcut ID are skipped.  Missing source files are
/// logged and listed in the report.
///
/// # Errors
///
/// Returns [`ArtworkError`] if the grid directory cannot be created or an
/// existing image cannot be copied.
pub fn install_artwork(library: &Library, grid_dir: &Path) -> Result<ArtworkReport, ArtworkError> {
    let mut report = ArtworkReport::default();
    let mut dir_ready = false;

    for entry in library.categories.values().flat_map(|c| &c.entries) {
        let Some(shortcut_id) = entry.app_id else {
            continue;
        };
        for kind in ArtworkKind::ALL {
            let Some(source) = kind.source(entry) else {
                continue;
            };
            let source = Path::new(source);
            if !source.is_file() {
                warn!("{}: artwork {} not found", entry.name, source.display());
                report.missing.push(source.to_path_buf());
                continue;
            }
            if !dir_ready {
                std::fs::create_dir_all(grid_dir).map_err(|e| ArtworkError::CreateDir {
                    path: grid_dir.to_path_buf(),
                    source: e,
                })?;
                dir_ready = true;
            }
            let target = grid_dir.join(kind.file_name(shortcut_id, source));
            std::fs::copy(source, &target).map_err(|e| ArtworkError::Copy {
                from: source.to_path_buf(),
                to: target.clone(),
                source: e,
            })?;
            debug!("installed {}", target.display());
            report.installed.push(target);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use librarian_core::Category;
    use uuid::Uuid;

    #[test]
    fn test_file_names_follow_steam_convention() {
        let png = Path::new("/art/cover.PNG");
        assert_eq!(ArtworkKind::Grid.file_name(42, png), "42.png");
        assert_eq!(ArtworkKind::Poster.file_name(42, png), "42p.png");
        assert_eq!(ArtworkKind::Hero.file_name(42, png), "42_hero.png");
        assert_eq!(ArtworkKind::Logo.file_name(42, png), "42_logo.png");
        assert_eq!(
            ArtworkKind::Icon.file_name(42, Path::new("/art/icon.ico")),
            "42_icon.ico"
        );
    }

    #[test]
    fn test_install_copies_existing_and_reports_missing() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("librarian_art_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let hero = dir.join("hero.jpg");
        std::fs::write(&hero, b"jpeg").unwrap();
        let missing = dir.join("nope.png");

        let mut library = Library::default();
        library.categories.insert(
            "Tools".to_string(),
            Category {
                default_launcher: None,
                entries: vec![
                    RomEntry {
                        name: "Bar".to_string(),
                        app_id: Some(7),
                        hero: Some(hero.display().to_string()),
                        logo: Some(missing.display().to_string()),
                        ..Default::default()
                    },
                    RomEntry {
                        name: "No id".to_string(),
                        grid: Some(hero.display().to_string()),
                        ..Default::default()
                    },
                ],
            },
        );
        let grid = dir.join("grid");

        // Act
        let report = install_artwork(&library, &grid).unwrap();

        // Assert
        assert_eq!(report.installed, vec![grid.join("7_hero.jpg")]);
        assert_eq!(report.missing, vec![missing]);
        assert_eq!(std::fs::read(grid.join("7_hero.jpg")).unwrap(), b"jpeg");
        std::fs::remove_dir_all(&dir).ok();
    }
}
