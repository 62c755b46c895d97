//! # Boxoffice Storage
//!
//! Durable key-value cache implementations for the Boxoffice storefront.
//!
//! The storefront keeps its client-side state (most importantly the cart)
//! in a single process-wide [`KeyValueStore`]. This crate provides:
//!
//! - [`FileStore`]: the production store, one JSON document on disk, flushed
//!   synchronously on every mutation so state survives a restart
//! - [`MemoryStore`]: the same semantics minus the disk write, for tests and
//!   ephemeral runs
//!
//! Both stores are `Clone` handles over shared interior state, so one store
//! is wired at application bootstrap and shared by every feature that needs
//! a cache key.
//!
//! Failure semantics follow the cache contract: a missing or corrupt backing
//! file initializes as an empty store, and flush failures are logged rather
//! than surfaced - the in-memory view stays authoritative for the session.

use boxoffice_core::environment::KeyValueStore;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Entries map shared by the store handles
type Entries = HashMap<String, Value>;

/// Durable key-value store backed by a single JSON file
///
/// Every mutation serializes the full map and writes it through a temp file
/// + rename, so the backing file is always a complete document.
///
/// # Example
///
/// ```no_run
/// use boxoffice_core::environment::KeyValueStore;
/// use boxoffice_storage::FileStore;
/// use serde_json::json;
///
/// let store = FileStore::open("state/storefront.json");
/// store.add("cart", json!([{"eventId": "evt-1"}]));
/// assert!(store.get("cart").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

#[derive(Debug)]
struct FileStoreInner {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStore {
    /// Open (or create) a store backed by the given file
    ///
    /// A missing file starts the store empty. A file that fails to parse is
    /// treated the same way: the previous contents are abandoned and the
    /// next mutation rewrites the file.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);

        Self {
            inner: Arc::new(FileStoreInner {
                path,
                entries: Mutex::new(entries),
            }),
        }
    }

    fn load(path: &Path) -> Entries {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Corrupt cache file, starting empty");
                    Entries::new()
                },
            },
            Err(_) => Entries::new(),
        }
    }

    /// Serialize the whole map and replace the backing file
    ///
    /// Called with the entries lock held, which is what makes mutations
    /// flush in the order they were applied.
    fn flush(&self, entries: &Entries) {
        let payload = match serde_json::to_string(entries) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(%error, "Failed to serialize cache contents");
                return;
            },
        };

        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(error) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), %error, "Failed to create cache directory");
                    return;
                }
            }
        }

        let tmp = self.inner.path.with_extension("tmp");
        if let Err(error) = std::fs::write(&tmp, payload) {
            tracing::warn!(path = %tmp.display(), %error, "Failed to write cache file");
            return;
        }

        if let Err(error) = std::fs::rename(&tmp, &self.inner.path) {
            tracing::warn!(path = %self.inner.path.display(), %error, "Failed to replace cache file");
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Entries> {
        // A poisoned lock only means another holder panicked mid-mutation;
        // the map itself is still a complete document.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for FileStore {
    fn add(&self, key: &str, value: Value) {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value);
        self.flush(&entries);
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    fn update(&self, key: &str, value: Value) {
        let mut entries = self.entries();
        if let Some(existing) = entries.get_mut(key) {
            *existing = value;
            self.flush(&entries);
        }
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries();
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }

    fn clear(&self) {
        let mut entries = self.entries();
        entries.clear();
        self.flush(&entries);
    }
}

/// In-memory key-value store with the same contract as [`FileStore`]
///
/// Used in tests and anywhere durability is not wanted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    ///
    /// Test convenience; production callers go through the trait.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn add(&self, key: &str, value: Value) {
        self.entries().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    fn update(&self, key: &str, value: Value) {
        let mut entries = self.entries();
        if let Some(existing) = entries.get_mut(key) {
            *existing = value;
        }
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    fn clear(&self) {
        self.entries().clear();
    }
}
