//! CodexDB main struct and lifecycle operations.
//!
//! The [`CodexDB`] struct is the primary interface for interacting with the
//! store. It owns the single live [`Document`] and provides methods for:
//!
//! - Opening, reloading, resetting and closing the store
//! - Reading the document and preferences
//! - Mutating them through the module mutators or [`CodexDB::mutate`]
//! - Exporting and importing backups
//! - Subscribing to save notices
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use codexdb::{CodexDB, Config};
//!
//! // Open or create a store
//! let mut db = CodexDB::open("./codex.db", Config::default())?;
//!
//! // Add a habit and mark it done today
//! let habit = db.add_habit("Read", "📖")?.value;
//! db.toggle_habit(&habit, &codexdb::today())?;
//!
//! // Close when done
//! db.close()?;
//! ```
//!
//! # Single writer
//!
//! Every mutator takes `&mut self`, so at most one writer exists per handle.
//! Two handles over the same store key do not coordinate: the last save wins.

use std::path::Path;

use crossbeam_channel::Receiver;
use tracing::{info, instrument, warn};

use crate::backup::ExportBundle;
use crate::config::Config;
use crate::document::Document;
use crate::error::{CodexError, Result};
use crate::events::{EventHub, StoreEvent};
use crate::gateway::{PersistenceGateway, SaveOutcome};
use crate::preferences::Preferences;
use crate::storage::{open_store, KeyValueStore};

/// Result of a successful mutation.
///
/// The mutation has been applied to the in-memory document. `save` reports
/// whether it also reached storage.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Commit<T> {
    /// What the mutation produced (usually the new record's id).
    pub value: T,
    /// Outcome of the save that followed the mutation.
    pub save: SaveOutcome,
}

impl<T> Commit<T> {
    /// Returns true if the mutation was persisted.
    pub fn is_saved(&self) -> bool {
        self.save.is_saved()
    }

    /// Discards the save outcome and returns the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping the save outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Commit<U> {
        Commit {
            value: f(self.value),
            save: self.save,
        }
    }
}

/// The main codexdb handle.
///
/// Create an instance with [`CodexDB::open()`] (durable redb file) or
/// [`CodexDB::open_with_store()`] (any [`KeyValueStore`]), and close it with
/// [`CodexDB::close()`].
pub struct CodexDB {
    /// Load/save boundary over the key-value store.
    gateway: PersistenceGateway,

    /// The single live document.
    document: Document,

    /// Live preferences.
    preferences: Preferences,

    /// Save/reset/import notices.
    events: EventHub,

    /// Configuration used to open this store.
    config: Config,
}

impl std::fmt::Debug for CodexDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodexDB")
            .field("config", &self.config)
            .field("records", &self.document.record_count())
            .finish_non_exhaustive()
    }
}

impl CodexDB {
    /// Opens or creates a store at the specified path and loads the document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid (see [`Config::validate`])
    /// - The store file is corrupted or locked
    /// - The store format version doesn't match
    ///
    /// A missing or undecodable *document* is not an error: the store opens
    /// with the default document.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate().map_err(CodexError::from)?;

        info!("Opening CodexDB");

        let store = open_store(&path, &config)?;
        Self::open_with_store(store, config)
    }

    /// Opens a handle over an existing store and loads the document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codexdb::{CodexDB, Config};
    /// use codexdb::storage::MemoryStore;
    ///
    /// let db = CodexDB::open_with_store(Box::new(MemoryStore::new()), Config::default()).unwrap();
    /// assert_eq!(db.document().treasury.categories.len(), 9);
    /// ```
    #[instrument(skip_all)]
    pub fn open_with_store(store: Box<dyn KeyValueStore>, config: Config) -> Result<Self> {
        config.validate().map_err(CodexError::from)?;

        let gateway = PersistenceGateway::new(store, &config)?;
        let document = gateway.load_document();
        let preferences = gateway.load_preferences();

        info!(
            document_key = %config.document_key,
            records = document.record_count(),
            sync_mode = ?config.sync_mode,
            "CodexDB opened successfully"
        );

        Ok(Self {
            gateway,
            document,
            preferences,
            events: EventHub::new(config.event_capacity),
            config,
        })
    }

    /// Closes the store, flushing all pending writes.
    ///
    /// This method consumes the `CodexDB` instance. Unsaved in-memory changes
    /// (from a save that failed) are not retried.
    #[instrument(skip(self))]
    pub fn close(self) -> Result<()> {
        info!("Closing CodexDB");

        self.gateway.close()?;

        info!("CodexDB closed successfully");
        Ok(())
    }

    /// Returns a reference to the configuration used to open the store.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the path of the backing file, if the store has one.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.gateway.store().path()
    }

    // =========================================================================
    // Collaborator interface
    // =========================================================================

    /// The live document.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The live preferences.
    #[inline]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Applies `f` to the document and saves it.
    ///
    /// If `f` returns an error the document is restored to its state before
    /// the call and nothing is saved.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codexdb::{CodexDB, Config};
    /// use codexdb::storage::MemoryStore;
    ///
    /// let store = Box::new(MemoryStore::new());
    /// let mut db = CodexDB::open_with_store(store, Config::default()).unwrap();
    /// let commit = db
    ///     .mutate(|doc| {
    ///         doc.gym.workout_types.push("Mobility".to_string());
    ///         Ok(doc.gym.workout_types.len())
    ///     })
    ///     .unwrap();
    /// assert_eq!(commit.value, 9);
    /// ```
    pub fn mutate<T, F>(&mut self, f: F) -> Result<Commit<T>>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let snapshot = self.document.clone();
        match f(&mut self.document) {
            Ok(value) => Ok(self.commit(value)),
            Err(err) => {
                self.document = snapshot;
                Err(err)
            }
        }
    }

    /// Saves the live document and broadcasts the outcome.
    pub fn persist(&self) -> SaveOutcome {
        let outcome = self.gateway.save_document(&self.document);
        self.publish_outcome(&self.config.document_key, &outcome);
        outcome
    }

    /// Registers a subscriber for [`StoreEvent`]s.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Lifecycle of the document
    // =========================================================================

    /// Discards the live state and loads it again from storage.
    #[instrument(skip(self))]
    pub fn reload(&mut self) {
        self.document = self.gateway.load_document();
        self.preferences = self.gateway.load_preferences();
        info!(records = self.document.record_count(), "Reloaded from storage");
    }

    /// Replaces the document with a fresh default and saves it.
    ///
    /// Preferences are kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> SaveOutcome {
        let (document, outcome) = self.gateway.reset_document();
        self.document = document;
        self.publish_outcome(&self.config.document_key, &outcome);
        self.events.publish(StoreEvent::Reset);
        warn!("Document reset to defaults");
        outcome
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Serializes the document and preferences as a backup file.
    pub fn export(&self) -> Result<Vec<u8>> {
        ExportBundle::new(&self.document, &self.preferences)?.to_bytes()
    }

    /// Replaces the live state with the contents of a backup file.
    ///
    /// `data` is merged with the schema defaults exactly like a normal load;
    /// `config`, when present, replaces the preferences the same way.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the file is not a backup (see
    /// [`ExportBundle::from_bytes`]); the live state is then unchanged.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn import(&mut self, bytes: &[u8]) -> Result<Commit<()>> {
        let bundle = ExportBundle::from_bytes(bytes)?;

        self.document = self.gateway.decode_document(&bundle.data);
        let mut save = self.persist();

        if let Some(config) = &bundle.config {
            self.preferences = self.gateway.decode_preferences(config);
            save = save.and(self.persist_preferences());
        }

        self.events.publish(StoreEvent::Imported);
        info!(
            app = %bundle.app,
            exported_at = %bundle.exported_at,
            records = self.document.record_count(),
            "Backup imported"
        );

        Ok(Commit { value: (), save })
    }

    // =========================================================================
    // Internal accessors (for use by module mutators)
    // =========================================================================

    /// Mutable access to the live document.
    #[inline]
    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Mutable access to the live preferences.
    #[inline]
    pub(crate) fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Saves the document and wraps `value` with the outcome.
    pub(crate) fn commit<T>(&self, value: T) -> Commit<T> {
        Commit {
            value,
            save: self.persist(),
        }
    }

    /// Saves the preferences and broadcasts the outcome.
    pub(crate) fn persist_preferences(&self) -> SaveOutcome {
        let outcome = self.gateway.save_preferences(&self.preferences);
        self.publish_outcome(&self.config.preferences_key, &outcome);
        outcome
    }

    fn publish_outcome(&self, key: &str, outcome: &SaveOutcome) {
        self.events.publish(StoreEvent::from_outcome(key, outcome));
    }
}

// CodexDB is auto Send + Sync: Box<dyn KeyValueStore + Send + Sync>, the
// event hub's Mutex and the plain-data document are all Send + Sync.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::storage::MemoryStore;
    use tempfile::tempdir;

    fn memory_db() -> (CodexDB, MemoryStore) {
        let store = MemoryStore::new();
        let db = CodexDB::open_with_store(Box::new(store.clone()), Config::default()).unwrap();
        (db, store)
    }

    #[test]
    fn test_open_creates_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codex.db");

        let db = CodexDB::open(&path, Config::default()).unwrap();

        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
        assert_eq!(db.document(), &Document::default());

        db.close().unwrap();
    }

    #[test]
    fn test_open_does_not_write_until_first_mutation() {
        let (_db, store) = memory_db();
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_config_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codex.db");

        let invalid_config = Config {
            event_capacity: 0,
            ..Default::default()
        };

        let result = CodexDB::open(&path, invalid_config);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_mutate_saves() {
        let (mut db, store) = memory_db();
        let commit = db
            .mutate(|doc| {
                doc.treasury.bank_balance = Some(100.0);
                Ok(())
            })
            .unwrap();

        assert!(commit.is_saved());
        assert_eq!(store.write_count(), 1);
        assert!(String::from_utf8(store.raw("codex_v1").unwrap())
            .unwrap()
            .contains("\"bankBalance\":100.0"));
    }

    #[test]
    fn test_mutate_error_restores_document() {
        let (mut db, store) = memory_db();
        let result: Result<Commit<()>> = db.mutate(|doc| {
            doc.treasury.categories.clear();
            Err(ValidationError::conflict("refused").into())
        });

        assert!(result.unwrap_err().is_validation());
        assert_eq!(db.document().treasury.categories.len(), 9);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state_and_notifies() {
        let (mut db, store) = memory_db();
        let events = db.subscribe();
        store.set_fail_writes(true);

        let commit = db
            .mutate(|doc| {
                doc.gym.workout_types.push("Climb".into());
                Ok(())
            })
            .unwrap();

        assert!(!commit.is_saved());
        assert_eq!(db.document().gym.workout_types.len(), 9);
        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::SaveFailed { key, .. } if key == "codex_v1"
        ));
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let (mut db, store) = memory_db();
        store.set_fail_writes(true);
        let _ = db
            .mutate(|doc| {
                doc.treasury.cash_balance = Some(5.0);
                Ok(())
            })
            .unwrap();

        db.reload();
        assert!(db.document().treasury.cash_balance.is_none());
    }

    #[test]
    fn test_reset_replaces_document() {
        let (mut db, _store) = memory_db();
        let events = db.subscribe();
        let _ = db
            .mutate(|doc| {
                doc.treasury.categories.clear();
                Ok(())
            })
            .unwrap();

        let outcome = db.reset();
        assert!(outcome.is_saved());
        assert_eq!(db.document(), &Document::default());

        let received: Vec<StoreEvent> = events.try_iter().collect();
        assert_eq!(received.last(), Some(&StoreEvent::Reset));
    }

    #[test]
    fn test_commit_map() {
        let commit = Commit {
            value: 2,
            save: SaveOutcome::Saved { bytes: 1 },
        };
        let mapped = commit.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert!(mapped.is_saved());
        assert_eq!(mapped.into_value(), 20);
    }

    #[test]
    fn test_codexdb_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodexDB>();
    }
}
