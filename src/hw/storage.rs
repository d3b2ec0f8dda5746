//! # Storage Medium
//!
//! Collaborator interface for the removable storage medium and its
//! filesystem implementation. The pipeline only ever appends; there is
//! no rename, truncate, or delete, so an append failure can never
//! corrupt records already on the medium.

use crate::error::{LoggerError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Trait for the storage collaborator
///
/// `append` must report failure through the result rather than
/// panicking; the pipeline observes failures and signals them.
pub trait Storage: Send {
    /// Append bytes to the file at `path`, creating it on first append
    fn append(&mut self, path: &str, data: &[u8]) -> Result<()>;
}

/// Removable-card storage rooted at a mount directory
#[derive(Debug)]
pub struct SdCardStorage {
    root: PathBuf,
}

impl SdCardStorage {
    /// Mount the storage root
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the mount directory does not exist
    /// or is not a directory (card absent or not mounted).
    pub fn mount<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let meta = std::fs::metadata(root).map_err(|e| {
            LoggerError::Storage(format!("mount point {} unavailable: {}", root.display(), e))
        })?;
        if !meta.is_dir() {
            return Err(LoggerError::Storage(format!(
                "mount point {} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Resolve a session-relative path against the mount root
    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for SdCardStorage {
    fn append(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)
            .map_err(|e| {
                LoggerError::Storage(format!("open {} for append: {}", target.display(), e))
            })?;
        file.write_all(data).map_err(|e| {
            LoggerError::Storage(format!("append to {}: {}", target.display(), e))
        })
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory storage with append-call fault injection
    #[derive(Clone, Default)]
    pub struct MemoryStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        appends: Arc<Mutex<usize>>,
        fail_on: Arc<Mutex<Option<usize>>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the k-th append call (1-based); later calls succeed
        pub fn fail_on_append(&self, k: usize) {
            *self.fail_on.lock().unwrap() = Some(k);
        }

        pub fn append_count(&self) -> usize {
            *self.appends.lock().unwrap()
        }

        pub fn has_file(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }

        pub fn contents(&self, path: &str) -> Option<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        pub fn line_count(&self, path: &str) -> usize {
            self.contents(path).map_or(0, |c| c.lines().count())
        }
    }

    impl Storage for MemoryStorage {
        fn append(&mut self, path: &str, data: &[u8]) -> Result<()> {
            let mut appends = self.appends.lock().unwrap();
            *appends += 1;
            if *self.fail_on.lock().unwrap() == Some(*appends) {
                return Err(LoggerError::Storage("injected append failure".to_string()));
            }
            self.files
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .extend_from_slice(data);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MemoryStorage;
    use super::*;

    #[test]
    fn test_mount_of_missing_directory_fails() {
        let result = SdCardStorage::mount("/nonexistent/sd-mount-point-12345");
        assert!(result.is_err());
        match result.unwrap_err() {
            LoggerError::Storage(msg) => assert!(msg.contains("unavailable")),
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    #[test]
    fn test_append_creates_then_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = SdCardStorage::mount(dir.path()).unwrap();
        assert!(format!("{:?}", storage).contains("SdCardStorage"));

        storage.append("100-gps.txt", b"first\n").unwrap();
        storage.append("100-gps.txt", b"second\n").unwrap();

        let written = std::fs::read_to_string(dir.path().join("100-gps.txt")).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[test]
    fn test_leading_slash_paths_stay_under_mount_root() {
        // Session filenames carry a leading slash; they must land on
        // the card, not at filesystem root
        let dir = tempfile::tempdir().unwrap();
        let mut storage = SdCardStorage::mount(dir.path()).unwrap();

        storage.append("/200-mpu.txt", b"x\n").unwrap();
        assert!(dir.path().join("200-mpu.txt").exists());
    }

    #[test]
    fn test_memory_storage_fault_injection() {
        let mut storage = MemoryStorage::new();
        storage.fail_on_append(2);

        assert!(storage.append("f", b"1\n").is_ok());
        assert!(storage.append("f", b"2\n").is_err());
        assert!(storage.append("f", b"3\n").is_ok(), "only the k-th fails");
        assert_eq!(storage.contents("f").unwrap(), "1\n3\n");
    }
}
