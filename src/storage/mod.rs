//! Storage layer abstractions for codexdb.
//!
//! This module provides a trait-based abstraction over the durable
//! key-value byte store, allowing different backends to be used.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CodexDB                                 │
//! │                         │                                    │
//! │                         ▼                                    │
//! │              ┌─────────────────────┐                        │
//! │              │ PersistenceGateway  │                        │
//! │              └─────────────────────┘                        │
//! │                         │                                    │
//! │                         ▼                                    │
//! │              ┌─────────────────────┐                        │
//! │              │   KeyValueStore     │  ← Trait               │
//! │              └─────────────────────┘                        │
//! │                    ▲         ▲                              │
//! │                    │         │                              │
//! │         ┌─────────┴─┐   ┌───┴─────────┐                    │
//! │         │ RedbStore │   │ MemoryStore │                    │
//! │         └───────────┘   └─────────────┘                    │
//! │           (durable)      (in-process)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod redb;
pub mod schema;

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;
pub use schema::{StoreMetadata, FORMAT_VERSION};

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

/// Durable key-value byte store.
///
/// The contract is deliberately small: whole values are read and written
/// by key, and a single `set` is atomic. codexdb never performs partial or
/// field-level writes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The engine handles internal
/// synchronization.
///
/// # Example
///
/// ```rust,ignore
/// use codexdb::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("codex_v1", b"{}")?;
/// assert_eq!(store.get("codex_v1")?.as_deref(), Some(&b"{}"[..]));
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key has never been written or was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`](crate::StorageError::QuotaExceeded)
    /// when the write would push the store past its quota (nothing is
    /// written), or another storage error if the write fails.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`.
    ///
    /// Returns `true` if the key existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Returns the path to the backing file, if applicable.
    ///
    /// In-memory implementations return `None`.
    fn path(&self) -> Option<&Path>;

    /// Closes the store, flushing any pending writes.
    ///
    /// This method consumes the store.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens the durable store at the given path.
///
/// This is a convenience function that creates a [`RedbStore`] instance.
/// For more control, use `RedbStore::open()` directly.
///
/// # Errors
///
/// Returns an error if:
/// - The store file is corrupted
/// - The store is locked by another process
/// - The format version doesn't match
pub fn open_store(path: impl AsRef<Path>, config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let store = RedbStore::open(path, config)?;
    Ok(Box::new(store))
}
