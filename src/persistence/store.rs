//! Durable key-value slots holding the raw snapshot

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

use crate::error::StoreError;

/// Key naming the single snapshot slot
pub const STORAGE_KEY: &str = "board-game-timer-state";

/// A single named slot that can hold one serialized snapshot
pub trait SnapshotStore: Send + Sync + std::fmt::Debug {
    /// Read the slot. `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Overwrite the slot
    fn write(&self, contents: &str) -> Result<(), StoreError>;

    /// Remove the slot. Erasing an empty slot is not an error.
    fn erase(&self) -> Result<(), StoreError>;
}

/// Snapshot slot backed by a JSON file named after [`STORAGE_KEY`]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store keeping its file inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for FileStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn erase(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-memory slot, used when no durable storage is wanted and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `contents`
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.slot
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        *self.lock()? = Some(contents.to_string());
        Ok(())
    }

    fn erase(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip_and_erase() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());

        assert!(store.read().unwrap().is_none());

        store.write("{\"a\":1}").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(store.path().ends_with("board-game-timer-state.json"));

        store.erase().unwrap();
        assert!(store.read().unwrap().is_none());
        store.erase().unwrap();
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path().join("nested").join("dir"));

        store.write("{}").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_contents("x");
        assert_eq!(store.read().unwrap().as_deref(), Some("x"));

        store.write("y").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("y"));

        store.erase().unwrap();
        assert!(store.read().unwrap().is_none());
    }
}
