//! redb storage engine implementation.
//!
//! This module provides the durable backend for codexdb using
//! [redb](https://docs.rs/redb), a pure Rust embedded key-value store.
//!
//! # Features
//!
//! - ACID transactions with MVCC: a document write is all-or-nothing
//! - Automatic crash recovery
//! - Byte quota enforced inside the write transaction
//!
//! # File Layout
//!
//! When you open a store at `./codex.db`, redb creates:
//! - `./codex.db` - Main database file
//! - `./codex.db.lock` - Lock file for writer coordination (may not be visible)

use std::path::{Path, PathBuf};

use ::redb::{Database, Durability, ReadableTable, WriteTransaction};
use tracing::{debug, info, instrument, warn};

use super::schema::{
    entry_footprint, StoreMetadata, ENTRIES_TABLE, FORMAT_VERSION, METADATA_KEY, METADATA_TABLE,
};
use super::KeyValueStore;
use crate::config::{Config, SyncMode};
use crate::error::{CodexError, Result, StorageError};

/// redb storage engine wrapper.
///
/// This struct holds the redb database handle and cached metadata.
/// It implements [`KeyValueStore`] for use with codexdb.
///
/// # Thread Safety
///
/// `RedbStore` is `Send + Sync`. redb handles internal synchronization
/// using MVCC for readers and exclusive locking for writers.
#[derive(Debug)]
pub struct RedbStore {
    /// The redb database handle.
    db: Database,

    /// Cached store metadata.
    metadata: StoreMetadata,

    /// Path to the database file.
    path: PathBuf,

    /// Byte quota over all entries, if any.
    quota_bytes: Option<usize>,

    /// Durability applied to every write transaction.
    sync_mode: SyncMode,
}

impl RedbStore {
    /// Opens or creates a store at the given path.
    ///
    /// If the file doesn't exist, it is created and initialized. If it
    /// exists, its metadata is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is corrupted or is not a codexdb store
    /// - The store is locked by another process
    /// - The format version doesn't match
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use codexdb::{Config, storage::RedbStore};
    ///
    /// let store = RedbStore::open("./codex.db", &Config::default())?;
    /// ```
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let store_exists = path.exists();

        debug!(store_exists = store_exists, "Opening storage engine");

        let db = Self::create_database(path)?;

        let (db, metadata) = if store_exists {
            Self::open_existing(db)?
        } else {
            Self::initialize_new(db)?
        };

        Ok(Self {
            db,
            metadata,
            path: path.to_path_buf(),
            quota_bytes: config.quota_bytes,
            sync_mode: config.sync_mode,
        })
    }

    /// Creates the redb database file.
    fn create_database(path: &Path) -> Result<Database> {
        // redb doesn't expose a typed error variant for lock conflicts,
        // so they are detected via the error message.
        let db = Database::builder().create(path).map_err(|e| {
            if e.to_string().contains("locked") {
                StorageError::StoreLocked
            } else {
                StorageError::Redb(e.to_string())
            }
        })?;

        debug!("Database file opened successfully");
        Ok(db)
    }

    /// Creates the tables and writes fresh metadata.
    fn initialize_new(db: Database) -> Result<(Database, StoreMetadata)> {
        info!("Initializing new store");

        let metadata = StoreMetadata::new();

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(METADATA_KEY, metadata_bytes.as_slice())?;

            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(format_version = FORMAT_VERSION, "Store initialized");
        Ok((db, metadata))
    }

    /// Validates metadata of an existing store and touches `last_opened_at`.
    fn open_existing(db: Database) -> Result<(Database, StoreMetadata)> {
        info!("Opening existing store");

        let read_txn = db.begin_read().map_err(StorageError::from)?;
        let metadata = {
            let meta_table = read_txn.open_table(METADATA_TABLE).map_err(|e| {
                StorageError::corrupted(format!("Cannot open metadata table: {}", e))
            })?;

            let metadata_bytes = meta_table
                .get(METADATA_KEY)
                .map_err(StorageError::from)?
                .ok_or_else(|| StorageError::corrupted("Missing store metadata"))?;

            decode_metadata(metadata_bytes.value())?
        };
        drop(read_txn);

        if !metadata.is_compatible() {
            warn!(
                expected = FORMAT_VERSION,
                found = metadata.format_version,
                "Format version mismatch"
            );
            return Err(CodexError::Storage(StorageError::FormatVersionMismatch {
                expected: FORMAT_VERSION,
                found: metadata.format_version,
            }));
        }

        let mut metadata = metadata;
        metadata.touch();

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(METADATA_KEY, metadata_bytes.as_slice())?;

            // Older files may predate the entries table.
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(
            format_version = metadata.format_version,
            "Store opened successfully"
        );
        Ok((db, metadata))
    }

    /// Returns the cached store metadata.
    #[inline]
    pub fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    /// Returns a reference to the underlying redb database.
    #[inline]
    #[cfg(test)]
    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    fn begin_write(&self) -> Result<WriteTransaction> {
        let mut write_txn = self.db.begin_write().map_err(StorageError::from)?;
        write_txn.set_durability(durability_for(self.sync_mode));
        write_txn.set_two_phase_commit(self.sync_mode.is_paranoid());
        Ok(write_txn)
    }
}

/// Maps the configured sync mode onto redb's durability levels.
///
/// Paranoid writes use `Immediate` plus two-phase commit.
fn durability_for(mode: SyncMode) -> Durability {
    match mode {
        SyncMode::Normal | SyncMode::Paranoid => Durability::Immediate,
        SyncMode::Fast => Durability::Eventual,
    }
}

/// Decodes the metadata record, rejecting bytes that only partly match it.
fn decode_metadata(bytes: &[u8]) -> Result<StoreMetadata> {
    let metadata = bincode::deserialize::<StoreMetadata>(bytes)
        .map_err(|e| StorageError::corrupted(format!("Invalid metadata format: {}", e)))?;
    let expected = bincode::serialized_size(&metadata)
        .map_err(|e| StorageError::serialization(e.to_string()))?;
    if expected != bytes.len() as u64 {
        return Err(StorageError::corrupted(format!(
            "Invalid metadata format: expected {} bytes, found {}",
            expected,
            bytes.len()
        ))
        .into());
    }
    Ok(metadata)
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let write_txn = self.begin_write()?;

        let needed = {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;

            let needed = match self.quota_bytes {
                Some(quota) => {
                    let mut total = entry_footprint(key, value.len());
                    for entry in table.iter()? {
                        let (stored_key, stored_value) = entry?;
                        if stored_key.value() != key {
                            total +=
                                entry_footprint(stored_key.value(), stored_value.value().len());
                        }
                    }
                    (total > quota).then_some((total, quota))
                }
                None => None,
            };

            if needed.is_none() {
                table.insert(key, value)?;
            }
            needed
        };

        if let Some((needed, quota)) = needed {
            write_txn.abort().map_err(StorageError::from)?;
            warn!(key, needed, quota, "Write refused: quota exceeded");
            return Err(StorageError::QuotaExceeded { needed, quota }.into());
        }

        write_txn.commit().map_err(StorageError::from)?;
        debug!(key, bytes = value.len(), "Entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_txn = self.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit().map_err(StorageError::from)?;

        debug!(key, existed, "Entry removed");
        Ok(existed)
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    #[instrument(skip(self))]
    fn close(self: Box<Self>) -> Result<()> {
        info!("Closing storage engine");

        // redb flushes all data durably on drop; the Result is kept for
        // backends that can report flush errors.
        drop(self.db);

        info!("Storage engine closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn default_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_open_creates_new_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = RedbStore::open(&path, &default_config()).unwrap();

        assert!(path.exists());
        assert_eq!(store.metadata().format_version, FORMAT_VERSION);
        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_metadata_preserved_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = RedbStore::open(&path, &default_config()).unwrap();
        let created_at = store.metadata().created_at;
        Box::new(store).close().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));

        let store = RedbStore::open(&path, &default_config()).unwrap();
        assert_eq!(store.metadata().created_at, created_at);
        assert!(store.metadata().last_opened_at > created_at);
        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("kv.db"), &default_config()).unwrap();

        assert!(store.get("codex_v1").unwrap().is_none());

        store.set("codex_v1", b"{\"a\":1}").unwrap();
        assert_eq!(store.get("codex_v1").unwrap().unwrap(), b"{\"a\":1}");

        store.set("codex_v1", b"{}").unwrap();
        assert_eq!(store.get("codex_v1").unwrap().unwrap(), b"{}");

        assert!(store.remove("codex_v1").unwrap());
        assert!(!store.remove("codex_v1").unwrap());
        assert!(store.get("codex_v1").unwrap().is_none());

        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("durable.db");

        let store = RedbStore::open(&path, &default_config()).unwrap();
        store.set("codex_v1", b"[1,2,3]").unwrap();
        Box::new(store).close().unwrap();

        let store = RedbStore::open(&path, &default_config()).unwrap();
        assert_eq!(store.get("codex_v1").unwrap().unwrap(), b"[1,2,3]");
        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_value() {
        let dir = tempdir().unwrap();
        let config = Config {
            quota_bytes: Some(32),
            ..Default::default()
        };
        let store = RedbStore::open(dir.path().join("quota.db"), &config).unwrap();

        // "codex_v1" (8) + 10 = 18 bytes
        store.set("codex_v1", b"0123456789").unwrap();

        let err = store.set("codex_v1", &[b'x'; 40]).unwrap_err();
        assert!(err.is_quota_exceeded(), "got {:?}", err);
        assert_eq!(store.get("codex_v1").unwrap().unwrap(), b"0123456789");

        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_quota_counts_other_keys() {
        let dir = tempdir().unwrap();
        let config = Config {
            quota_bytes: Some(40),
            ..Default::default()
        };
        let store = RedbStore::open(dir.path().join("quota.db"), &config).unwrap();

        store.set("codex_config", &[b'p'; 20]).unwrap(); // 12 + 20 = 32
        let err = store.set("codex_v1", b"0123456789").unwrap_err(); // 32 + 18 > 40
        match err {
            CodexError::Storage(StorageError::QuotaExceeded { needed, quota }) => {
                assert_eq!(needed, 50);
                assert_eq!(quota, 40);
            }
            other => panic!("Expected QuotaExceeded, got: {:?}", other),
        }

        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_unlimited_quota() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("big.db"), &Config::unlimited()).unwrap();
        let big = vec![b'z'; 6 * 1024 * 1024];
        store.set("codex_v1", &big).unwrap();
        assert_eq!(store.get("codex_v1").unwrap().unwrap().len(), big.len());
        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_corruption_detection_invalid_metadata_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.db");

        let store = RedbStore::open(&path, &default_config()).unwrap();
        let write_txn = store.database().begin_write().unwrap();
        {
            let mut meta = write_txn.open_table(METADATA_TABLE).unwrap();
            meta.insert(METADATA_KEY, b"not-valid-bincode-data".as_slice())
                .unwrap();
        }
        write_txn.commit().unwrap();
        Box::new(store).close().unwrap();

        let result = RedbStore::open(&path, &default_config());
        match result {
            Err(CodexError::Storage(StorageError::Corrupted(msg))) => {
                assert!(
                    msg.contains("Invalid metadata format"),
                    "Error should mention invalid format, got: {}",
                    msg
                );
            }
            other => panic!("Expected StorageError::Corrupted, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_metadata_rejects_partial_matches() {
        let valid = bincode::serialize(&StoreMetadata::new()).unwrap();
        assert!(decode_metadata(&valid).is_ok());

        let mut trailing = valid.clone();
        trailing.push(0);
        assert!(decode_metadata(&trailing).unwrap_err().is_storage());
        assert!(decode_metadata(&valid[..valid.len() - 1]).is_err());
    }

    #[test]
    fn test_sync_modes_map_to_durability() {
        assert!(matches!(durability_for(SyncMode::Normal), Durability::Immediate));
        assert!(matches!(durability_for(SyncMode::Paranoid), Durability::Immediate));
        assert!(matches!(durability_for(SyncMode::Fast), Durability::Eventual));
    }

    #[test]
    fn test_paranoid_store_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paranoid.db");
        let config = Config {
            sync_mode: SyncMode::Paranoid,
            ..Default::default()
        };

        let store = RedbStore::open(&path, &config).unwrap();
        store.set("codex_v1", b"{}").unwrap();
        Box::new(store).close().unwrap();

        let store = RedbStore::open(&path, &config).unwrap();
        assert_eq!(store.get("codex_v1").unwrap().unwrap(), b"{}");
        Box::new(store).close().unwrap();
    }

    #[test]
    fn test_corruption_detection_missing_metadata_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foreign.db");

        // A redb file that is not a codexdb store
        {
            let db = ::redb::Database::create(&path).unwrap();
            let write_txn = db.begin_write().unwrap();
            {
                let dummy: ::redb::TableDefinition<&str, &str> =
                    ::redb::TableDefinition::new("dummy");
                let mut table = write_txn.open_table(dummy).unwrap();
                table.insert("key", "value").unwrap();
            }
            write_txn.commit().unwrap();
        }

        let result = RedbStore::open(&path, &default_config());
        match result {
            Err(CodexError::Storage(StorageError::Corrupted(msg))) => {
                assert!(
                    msg.contains("Cannot open metadata table"),
                    "Error should mention metadata table, got: {}",
                    msg
                );
            }
            other => panic!("Expected StorageError::Corrupted, got: {:?}", other),
        }
    }
}
