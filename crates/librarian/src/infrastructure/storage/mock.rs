//! In-memory store files for unit and integration testing.
//!
//! Lets tests run full sync passes without touching the filesystem, and
//! inspect what was written, backed up, or left alone.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::application::sync_library::StoreFiles;

/// A [`StoreFiles`] implementation backed by a map of paths to bytes.
#[derive(Clone, Default)]
pub struct MemoryStoreFiles {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    write_count: Arc<Mutex<u32>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryStoreFiles {
    /// Creates an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `bytes` at `path`, as if another program had written it.
    pub fn insert(&self, path: &Path, bytes: Vec<u8>) {
        self.files
            .lock()
            .expect("lock poisoned")
            .insert(path.to_path_buf(), bytes);
    }

    /// Returns the current contents of `path`.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().expect("lock poisoned").get(path).cloned()
    }

    /// Returns the number of successful [`StoreFiles::write_atomic`] calls.
    pub fn write_count(&self) -> u32 {
        *self.write_count.lock().expect("lock poisoned")
    }

    /// Makes every subsequent write fail with `PermissionDenied`.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().expect("lock poisoned") = true;
    }
}

impl StoreFiles for MemoryStoreFiles {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents(path))
    }

    fn backup(&self, path: &Path, backup: &Path) -> io::Result<()> {
        let bytes = self
            .contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "nothing to back up"))?;
        self.insert(backup, bytes);
        Ok(())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if *self.fail_writes.lock().expect("lock poisoned") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.insert(path, bytes.to_vec());
        *self.write_count.lock().expect("lock poisoned") += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_returns_bytes() {
        // Arrange
        let files = MemoryStoreFiles::new();
        let path = Path::new("/a/shortcuts.vdf");

        // Act
        files.write_atomic(path, b"abc").unwrap();

        // Assert
        assert_eq!(files.read(path).unwrap(), Some(b"abc".to_vec()));
        assert_eq!(files.write_count(), 1);
    }

    #[test]
    fn test_backup_of_missing_file_fails() {
        let files = MemoryStoreFiles::new();
        let err = files
            .backup(Path::new("/missing"), Path::new("/missing.bak"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_write_leaves_contents_unchanged() {
        let files = MemoryStoreFiles::new();
        let path = Path::new("/a/shortcuts.vdf");
        files.insert(path, b"old".to_vec());
        files.fail_writes();

        assert!(files.write_atomic(path, b"new").is_err());
        assert_eq!(files.contents(path), Some(b"old".to_vec()));
        assert_eq!(files.write_count(), 0);
    }
}
