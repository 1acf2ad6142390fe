//! Store layout, limits and versioning.
//!
//! The durable store is a flat key-value namespace. codexdb owns exactly two
//! keys in it (the document and the preferences) and never reads or writes
//! any other entry.
//!
//! # Table Layout (redb backend)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ ENTRIES_TABLE                                                │
//! │   Key: &str (storage key, e.g. "codex_v1")                   │
//! │   Value: &[u8] (UTF-8 JSON document)                         │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │ METADATA_TABLE                                               │
//! │   Key: &str                                                  │
//! │   Value: &[u8] (bincode)                                     │
//! │   Entries: "store_metadata" -> StoreMetadata                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Versioning
//!
//! `FORMAT_VERSION` describes the table layout, not the document schema. The
//! document has no version field: it evolves append-only and is reconciled
//! structurally by the merge engine on every load.

use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Current store format version.
///
/// Increment this when the table layout changes.
/// The store refuses to open if versions don't match.
pub const FORMAT_VERSION: u32 = 1;

/// Storage key of the document written by the first app generation.
pub const DEFAULT_DOCUMENT_KEY: &str = "codex_v1";

/// Storage key of the preferences document.
pub const DEFAULT_PREFERENCES_KEY: &str = "codex_config";

/// Default quota: 5 MiB, the usual browser local-storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Maximum length of a storage key.
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum length of a short label (names, icons, titles, notes).
pub const MAX_LABEL_LENGTH: usize = 200;

/// Maximum journal entry content size in bytes (100 KB).
pub const MAX_CONTENT_SIZE: usize = 100 * 1024;

/// Maximum number of tags on a journal entry.
pub const MAX_TAGS: usize = 20;

/// Maximum number of exercises in one workout session.
pub const MAX_EXERCISES: usize = 50;

/// Maximum number of sets per exercise.
pub const MAX_SETS: usize = 100;

/// Metadata key in the metadata table.
pub const METADATA_KEY: &str = "store_metadata";

// ============================================================================
// Table Definitions
// ============================================================================

/// Key-value entries (the documents).
pub const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Store-level metadata.
pub const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

// ============================================================================
// Store Metadata
// ============================================================================

/// Store metadata kept in the metadata table.
///
/// This is serialized with bincode and stored under the key "store_metadata".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Table layout version for compatibility checking.
    pub format_version: u32,

    /// When the store was created.
    pub created_at: Timestamp,

    /// Last time the store was opened (updated on each open).
    pub last_opened_at: Timestamp,
}

impl StoreMetadata {
    /// Creates metadata for a fresh store.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            format_version: FORMAT_VERSION,
            created_at: now,
            last_opened_at: now,
        }
    }

    /// Updates the last_opened_at timestamp.
    pub fn touch(&mut self) {
        self.last_opened_at = Timestamp::now();
    }

    /// Checks if this metadata is compatible with the current format.
    pub fn is_compatible(&self) -> bool {
        self.format_version == FORMAT_VERSION
    }
}

impl Default for StoreMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes an entry occupies against the quota (key plus value).
#[inline]
pub fn entry_footprint(key: &str, value_len: usize) -> usize {
    key.len() + value_len
}
