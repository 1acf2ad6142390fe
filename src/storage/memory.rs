//! In-process key-value store.
//!
//! [`MemoryStore`] keeps entries in a shared map. Clones share the same
//! entries, so two `CodexDB` handles opened on clones of one store behave
//! like two tabs sharing one browser storage: each loads, mutates and saves
//! independently, and the last save wins.
//!
//! It also supports the failure modes a browser store has: a byte quota and
//! a switch that makes every write fail as if storage were unavailable.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::schema::entry_footprint;
use super::KeyValueStore;
use crate::error::{Result, StorageError};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
    fail_writes: bool,
    writes: u64,
}

/// Shared in-memory [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store with no quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with a byte quota over all entries.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let store = Self::new();
        store.set_quota(Some(quota_bytes));
        store
    }

    /// Changes the byte quota. `None` removes it.
    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        self.lock().quota_bytes = quota_bytes;
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Writes raw bytes under `key`, bypassing quota and failure injection.
    ///
    /// Useful for seeding documents written by other app generations.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.lock().entries.insert(key.into(), value.into());
    }

    /// Returns the raw bytes under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(key).cloned()
    }

    /// Returns all keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    /// Total bytes held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .map(|(k, v)| entry_footprint(k, v.len()))
            .sum()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the map itself consistent:
        // every mutation is a single insert/remove.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut inner = self.lock();

        if inner.fail_writes {
            warn!(key, "Write refused: store unavailable");
            return Err(StorageError::unavailable("writes are disabled").into());
        }

        if let Some(quota) = inner.quota_bytes {
            let others: usize = inner
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_footprint(k, v.len()))
                .sum();
            let needed = others + entry_footprint(key, value.len());
            if needed > quota {
                warn!(key, needed, quota, "Write refused: quota exceeded");
                return Err(StorageError::QuotaExceeded { needed, quota }.into());
            }
        }

        inner.entries.insert(key.to_string(), value.to_vec());
        inner.writes += 1;
        debug!(key, bytes = value.len(), "Entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock().entries.remove(key).is_some())
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
