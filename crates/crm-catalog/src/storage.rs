//! Storage adapters implementing `KeyValueStore`.
//!
//! `MemoryStore` keeps values in a shared `HashMap`; clones observe the same
//! map, which is how two browser tabs over one local storage behave.
//! `FileStore` keeps one `<key>.json` file per key under a root directory.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::debug;

use crm_contracts::{CrmError, CrmResult};
use crm_core::{
    config::{StorageBackend, StorageConfig},
    traits::KeyValueStore,
};

// ── Memory ────────────────────────────────────────────────────────────────────

/// Process-local storage. `Clone` shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> CrmError {
    CrmError::Storage {
        reason: format!("memory store lock poisoned: {}", e),
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CrmResult<Option<String>> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CrmResult<()> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CrmResult<()> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

/// Directory-backed storage: key `crm.roles` lives in `<root>/crm.roles.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> CrmResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(CrmError::InvalidInput {
                reason: format!("storage key '{}' is not a valid file name", key),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CrmResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CrmError::Storage {
                reason: format!("failed to read '{}': {}", path.display(), e),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> CrmResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root).map_err(|e| CrmError::Storage {
            reason: format!("failed to create '{}': {}", self.root.display(), e),
        })?;

        let tmp = self.root.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).map_err(|e| CrmError::Storage {
            reason: format!("failed to write '{}': {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| CrmError::Storage {
            reason: format!("failed to replace '{}': {}", path.display(), e),
        })?;

        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> CrmResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CrmError::Storage {
                reason: format!("failed to remove '{}': {}", path.display(), e),
            }),
        }
    }
}

/// Build the adapter selected by configuration.
pub fn open_storage(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match config.backend {
        StorageBackend::File => Arc::new(FileStore::new(config.dir.clone())),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
