//! Key/value persistence adapter.
//!
//! Every piece of engine state (contractors, current session, report ledger,
//! device identity) is serialized to a string and stored under a well-known
//! key. The keys are independent of each other; there is no transactional
//! boundary across them.
//!
//! # Storage Layout (file-backed store)
//!
//! ```text
//! ~/.local/share/scanledger/
//! ├── contractors.json       # contractor directory
//! ├── current_session.json   # in-progress scan session
//! ├── reports.json           # report ledger (most-recent-first)
//! ├── report_counter.json    # next sequential report number
//! ├── sent_log.json          # sequence numbers marked as sent
//! ├── selected_ids.json      # last selected contractor ids
//! └── device_id.json         # stable device identity
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Well-known storage keys.
pub mod keys {
    /// Contractor directory.
    pub const CONTRACTORS: &str = "contractors";
    /// Current (in-progress) scan session.
    pub const CURRENT_SESSION: &str = "current_session";
    /// Report ledger, most-recent-first.
    pub const REPORTS: &str = "reports";
    /// Next sequential report number.
    pub const REPORT_COUNTER: &str = "report_counter";
    /// Sequence numbers of reports that have been sent.
    pub const SENT_LOG: &str = "sent_log";
    /// Contractor ids selected when the last session was started.
    pub const SELECTED_IDS: &str = "selected_ids";
    /// Stable per-device identifier.
    pub const DEVICE_ID: &str = "device_id";
}

/// Errors that can occur when reading or writing persisted state.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing the backing file.
    Io(std::io::Error),
    /// The store's lock was poisoned by a panicking writer.
    Poisoned,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Poisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Poisoned => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Synchronous key/value store contract.
///
/// All operations are idempotent. Implementations must be safe to share
/// across the whole engine; the engine itself is single-call-path, so no
/// finer-grained coordination is needed.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value under `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// File-backed store keeping one file per key in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `data_dir`. The directory is created on
    /// the first write.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the backing file path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_noop() {
        let store = MemoryStore::new();
        store.remove("missing").unwrap();
    }

    #[test]
    fn test_file_store_get_absent_returns_none() {
        let (store, _temp) = test_store();
        assert_eq!(store.get(keys::CONTRACTORS).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = FileStore::new(nested.clone());

        store.set(keys::CONTRACTORS, "[]").unwrap();

        assert!(nested.exists());
        assert_eq!(store.get(keys::CONTRACTORS).unwrap(), Some("[]".into()));
    }

    #[test]
    fn test_file_store_overwrite() {
        let (store, _temp) = test_store();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_file_store_remove() {
        let (store, _temp) = test_store();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // Removing again is a no-op.
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_path_uses_key_name() {
        let (store, _temp) = test_store();
        let path = store.path(keys::REPORTS);
        assert!(path.ends_with("reports.json"));
    }
}
