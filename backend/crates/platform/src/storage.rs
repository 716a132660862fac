//! Local Persistent Cache
//!
//! Key → string storage used to mirror the current session on the client.
//! Semantics follow browser local storage: synchronous, last write wins,
//! removing a missing key is not an error.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// Port
// ============================================================================

/// Local key/value cache
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Process-local cache, lost on exit
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON file implementation
// ============================================================================

/// Cache persisted as a single JSON object on disk
///
/// Every mutation rewrites the file; the in-memory map only changes once the
/// write succeeded.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open (or lazily create) the cache file at `path`
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = read_json_or_default(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        f(&mut next);
        write_json_atomic(&self.path, &next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if !self.entries.lock().contains_key(key) {
            return Ok(());
        }
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

// ============================================================================
// Snapshot helpers
// ============================================================================

/// Read a JSON file, returning `T::default()` when it does not exist or is empty
pub fn read_json_or_default<T>(path: &Path) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write `value` as pretty JSON via a temporary file and rename
pub fn write_json_atomic<T>(path: &Path, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;

    tracing::trace!(path = %path.display(), "Snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("jf_user").unwrap(), None);

        store.set("jf_user", "{}").unwrap();
        assert_eq!(store.get("jf_user").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);

        store.remove("jf_user").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryKeyValueStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        {
            let store = FileKeyValueStore::open(&path).unwrap();
            store.set("jf_user", "alice").unwrap();
            store.set("jf_user_data", "{}").unwrap();
            store.remove("jf_user_data").unwrap();
        }

        let store = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get("jf_user").unwrap().as_deref(), Some("alice"));
        assert_eq!(store.get("jf_user_data").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"not json").unwrap();

        let err = FileKeyValueStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"\n").unwrap();

        let map: BTreeMap<String, String> = read_json_or_default(&path).unwrap();
        assert!(map.is_empty());
    }
}
