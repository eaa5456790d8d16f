//! Filesystem implementation of [`StoreFiles`].
//!
//! Writes go to a uniquely named sibling of the store and are renamed into
//! place, so Steam never reads a half-written `shortcuts.vdf`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::application::sync_library::StoreFiles;

/// [`StoreFiles`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStoreFiles;

impl FsStoreFiles {
    pub fn new() -> Self {
        Self
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

impl StoreFiles for FsStoreFiles {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn backup(&self, path: &Path, backup: &Path) -> io::Result<()> {
        std::fs::copy(path, backup).map(|_| ())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = temp_sibling(path);
        let result = (|| {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            std::fs::rename(&tmp, path)
        })();
        match &result {
            Ok(()) => debug!("replaced {} ({} bytes)", path.display(), bytes.len()),
            // Best effort; the original error is what matters.
            Err(_) => {
                let _ = std::fs::remove_file(&tmp);
            }
        }
        result
    }
}
