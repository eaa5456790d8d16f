//! SyncLibraryUseCase: one full reconciliation pass against `shortcuts.vdf`.
//!
//! # Steps
//!
//! 1. Build the declared entries from the catalogue library.
//! 2. Read and decode the current store (a missing file is an empty store).
//! 3. Reconcile the store with the library's pointers and declared entries.
//! 4. Encode the result.  If it matches the previous bytes, stop here.
//! 5. Back up the previous file, then replace it atomically.
//! 6. Hand the new pointer list back to the library.
//!
//! File access goes through the [`StoreFiles`] trait so the pass can be
//! tested against an in-memory store.

use std::io;
use std::path::{Path, PathBuf};

use librarian_core::{read_shortcuts, write_shortcuts, Library, Shortcut, ShortcutsError};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::build_entries::{build_entries, BuildError};
use crate::application::reconcile::{reconcile, ReconcileError, ReconcileReport};

// ── StoreFiles trait ──────────────────────────────────────────────────────────

/// File operations the sync pass needs.
pub trait StoreFiles {
    /// Reads `path`, returning `None` if it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Copies `path` to `backup`, replacing any earlier backup.
    fn backup(&self, path: &Path, backup: &Path) -> io::Result<()>;

    /// Replaces `path` with `bytes` so readers never see a partial file.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store exists but is not a valid shortcut store.  Nothing is written.
    #[error("{path} is not a valid shortcut store: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ShortcutsError,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ── Options and outcome ───────────────────────────────────────────────────────

/// Where the store lives and how to protect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub store_path: PathBuf,
    /// Extension appended to the store path for the backup copy; `None`
    /// disables backups.
    pub backup_extension: Option<String>,
}

impl SyncOptions {
    /// Path of the backup copy, if backups are enabled.
    pub fn backup_path(&self) -> Option<PathBuf> {
        let ext = self.backup_extension.as_deref()?;
        let mut name = self.store_path.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        Some(PathBuf::from(name))
    }
}

/// What a sync pass did.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub report: ReconcileReport,
    /// The store contents after the pass.
    pub shortcuts: Vec<Shortcut>,
    /// `false` when the store already matched and was left untouched.
    pub written: bool,
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Runs one reconciliation pass and updates `library.pointers`.
///
/// The library is only modified once the store has been written (or found
/// to be already up to date).
///
/// # Errors
///
/// See [`SyncError`].  A decode failure leaves both the store and the
/// library untouched.
pub fn sync_library<F: StoreFiles>(
    files: &F,
    options: &SyncOptions,
    library: &mut Library,
) -> Result<SyncOutcome, SyncError> {
    let path = &options.store_path;
    let declared = build_entries(library)?;
    debug!("{} declared entries", declared.len());

    let previous = files.read(path).map_err(|source| SyncError::Read {
        path: path.clone(),
        source,
    })?;
    let existing = match &previous {
        Some(bytes) => read_shortcuts(bytes).map_err(|source| SyncError::Decode {
            path: path.clone(),
            source,
        })?,
        None => {
            info!("{} does not exist yet; starting from an empty store", path.display());
            Vec::new()
        }
    };
    debug!("{} shortcuts in store", existing.len());

    let reconciliation = reconcile(&existing, &library.pointers, &declared)?;
    let bytes = write_shortcuts(&reconciliation.shortcuts);

    let written = previous.as_deref() != Some(bytes.as_slice());
    if written {
        if let (Some(_), Some(backup)) = (&previous, options.backup_path()) {
            files
                .backup(path, &backup)
                .map_err(|source| SyncError::Backup {
                    path: backup.clone(),
                    source,
                })?;
            debug!("backed up store to {}", backup.display());
        }
        files
            .write_atomic(path, &bytes)
            .map_err(|source| SyncError::Write {
                path: path.clone(),
                source,
            })?;
        info!(
            "wrote {} shortcuts to {}",
            reconciliation.shortcuts.len(),
            path.display()
        );
    } else {
        info!("{} is up to date", path.display());
    }

    library.pointers = reconciliation.pointers;

    Ok(SyncOutcome {
        report: reconciliation.report,
        shortcuts: reconciliation.shortcuts,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::mock::MemoryStoreFiles;
    use librarian_core::{Category, CataloguePointer, Launcher, RomEntry};

    fn options() -> SyncOptions {
        SyncOptions {
            store_path: PathBuf::from("/steam/userdata/1/config/shortcuts.vdf"),
            backup_extension: Some("bak".to_string()),
        }
    }

    fn library() -> Library {
        let mut library = Library::default();
        library.launchers.insert(
            "bar".to_string(),
            Launcher {
                executable: "/bin/bar".to_string(),
                arguments: Vec::new(),
                open_vr: false,
            },
        );
        library.categories.insert(
            "Tools".to_string(),
            Category {
                default_launcher: Some("bar".to_string()),
                entries: vec![RomEntry {
                    name: "Bar".to_string(),
                    ..Default::default()
                }],
            },
        );
        library
    }

    #[test]
    fn test_first_pass_creates_store_without_backup() {
        // Arrange
        let files = MemoryStoreFiles::new();
        let mut library = library();

        // Act
        let outcome = sync_library(&files, &options(), &mut library).unwrap();

        // Assert
        assert!(outcome.written);
        assert_eq!(outcome.report.created, vec!["Bar"]);
        assert!(files.contents(&options().store_path).is_some());
        assert!(files.contents(&options().backup_path().unwrap()).is_none());
        assert_eq!(files.write_count(), 1);
    }

    #[test]
    fn test_second_pass_leaves_store_untouched() {
        let files = MemoryStoreFiles::new();
        let mut library = library();
        sync_library(&files, &options(), &mut library).unwrap();

        let outcome = sync_library(&files, &options(), &mut library).unwrap();

        assert!(!outcome.written);
        assert_eq!(files.write_count(), 1);
    }

    #[test]
    fn test_changed_store_is_backed_up_before_write() {
        let files = MemoryStoreFiles::new();
        let mut library = library();
        sync_library(&files, &options(), &mut library).unwrap();
        let before = files.contents(&options().store_path).unwrap();

        library.categories.get_mut("Tools").unwrap().entries.push(RomEntry {
            name: "Baz".to_string(),
            path: Some("/roms/baz".to_string()),
            ..Default::default()
        });
        let outcome = sync_library(&files, &options(), &mut library).unwrap();

        assert!(outcome.written);
        assert_eq!(files.contents(&options().backup_path().unwrap()), Some(before));
        assert_eq!(outcome.shortcuts.len(), 2);
    }

    #[test]
    fn test_corrupt_store_is_not_overwritten() {
        let files = MemoryStoreFiles::new();
        files.insert(&options().store_path, b"\x00shortcuts\x00\x09".to_vec());
        let mut library = library();
        library.pointers.push(CataloguePointer::new("1", "Kept"));

        let err = sync_library(&files, &options(), &mut library).unwrap_err();

        assert!(matches!(err, SyncError::Decode { .. }));
        assert_eq!(files.write_count(), 0);
        assert_eq!(library.pointers.len(), 1);
    }

    #[test]
    fn test_removed_entry_becomes_pointer() {
        let files = MemoryStoreFiles::new();
        let mut library = library();
        sync_library(&files, &options(), &mut library).unwrap();

        library.categories.clear();
        let outcome = sync_library(&files, &options(), &mut library).unwrap();

        assert!(!outcome.written);
        assert_eq!(library.pointers.len(), 1);
        assert_eq!(library.pointers[0].app_name, "Bar");
    }

    #[test]
    fn test_backup_path_appends_extension() {
        assert_eq!(
            options().backup_path(),
            Some(PathBuf::from("/steam/userdata/1/config/shortcuts.vdf.bak"))
        );
        let no_backup = SyncOptions {
            backup_extension: None,
            ..options()
        };
        assert_eq!(no_backup.backup_path(), None);
    }
}
