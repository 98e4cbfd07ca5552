//! Key/value storage primitive.
//!
//! Two scopes back the client:
//! - **tab-scoped** state (mode, sandbox return path) lives in a [`MemoryStore`]
//!   owned by one provider and dropped with it;
//! - **local** state (tenant identifier) lives in a [`FileStore`] that survives
//!   restarts.
//!
//! Writes are infallible from the caller's point of view: a file store that
//! cannot persist logs a warning and keeps serving the in-memory value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::errors::StorageError;

/// String key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);
    /// Delete a value. Missing keys are ignored.
    fn remove(&self, key: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-process store; one instance per tab/session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let _ = self.entries.write().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let _ = self.entries.write().remove(key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStore
// ─────────────────────────────────────────────────────────────────────────────

/// Durable store backed by a JSON object file, written through on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file yields an empty store; an unreadable or non-JSON file is
    /// an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| StorageError::Json {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            debug!(path = %path.display(), "local store not found, starting empty");
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = write_atomic(&self.path, entries) {
            warn!(path = %self.path.display(), error = %e, "failed to persist local store");
        }
    }
}

fn write_atomic(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write();
        let _ = entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("orbit_app_mode", "sandbox");
        assert_eq!(store.get("orbit_app_mode").as_deref(), Some("sandbox"));
        store.set("orbit_app_mode", "live");
        assert_eq!(store.get("orbit_app_mode").as_deref(), Some("live"));
        store.remove("orbit_app_mode");
        assert!(store.get("orbit_app_mode").is_none());
        store.remove("orbit_app_mode");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn memory_store_with_entries() {
        let store = MemoryStore::with_entries([("tenantId", "acme")]);
        assert_eq!(store.get("tenantId").as_deref(), Some("acme"));
    }

    #[test]
    fn memory_stores_are_independent() {
        let a = MemoryStore::new();
        let b = MemoryStore::new();
        a.set("k", "v");
        assert!(b.get("k").is_none());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("local.json")).unwrap();
        assert!(store.get("tenantId").is_none());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("tenantId", "tenant-9");
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("tenantId").as_deref(), Some("tenant-9"));
    }

    #[test]
    fn file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        let store = FileStore::open(&path).unwrap();
        store.set("a", "1");
        store.set("b", "2");
        store.remove("a");
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("a").is_none());
        assert_eq!(reopened.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn file_store_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_matches!(FileStore::open(&path), Err(StorageError::Json { .. }));
    }

    #[test]
    fn file_store_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert!(store.get("anything").is_none());
        assert_eq!(store.path(), path.as_path());
    }
}
