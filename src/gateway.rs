//! Persistence gateway: the only code that touches the key-value store.
//!
//! The gateway turns store reads into typed values and typed values into
//! store writes, and it never fails outward:
//!
//! - loads that find nothing, or something undecodable, return defaults
//! - saves report their outcome as a [`SaveOutcome`] value
//!
//! Only the two configured keys are ever read or written.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::document::{merge, Document, Shape};
use crate::error::{CodexError, Result, StorageError};
use crate::preferences::Preferences;
use crate::storage::KeyValueStore;

/// Result of writing a value to the store.
///
/// A failed save leaves the in-memory value intact; the caller decides
/// whether to surface the failure.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The value was written.
    Saved {
        /// Serialized size in bytes.
        bytes: usize,
    },
    /// The store refused the write because of its quota.
    QuotaExceeded {
        /// Total bytes the store would have held.
        needed: usize,
        /// Configured quota.
        quota: usize,
    },
    /// The write failed for another reason.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl SaveOutcome {
    /// Returns true if the value was written.
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Returns true if the quota refused the write.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Short notice suitable for showing to the user, or `None` on success.
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::Saved { .. } => None,
            Self::QuotaExceeded { .. } => Some("Storage full!".to_string()),
            Self::Failed { reason } => Some(format!("Save failed: {reason}")),
        }
    }

    /// Combines two outcomes, keeping the first failure.
    pub fn and(self, other: SaveOutcome) -> SaveOutcome {
        match (self, other) {
            (Self::Saved { bytes: a }, Self::Saved { bytes: b }) => Self::Saved { bytes: a + b },
            (Self::Saved { .. }, failure) => failure,
            (failure, _) => failure,
        }
    }

    fn from_write(result: Result<()>, bytes: usize) -> Self {
        match result {
            Ok(()) => Self::Saved { bytes },
            Err(CodexError::Storage(StorageError::QuotaExceeded { needed, quota })) => {
                Self::QuotaExceeded { needed, quota }
            }
            Err(err) => Self::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// Reads and writes the document and preferences through a [`KeyValueStore`].
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
    document_key: String,
    preferences_key: String,
    document_shape: Shape,
    preferences_shape: Shape,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("document_key", &self.document_key)
            .field("preferences_key", &self.preferences_key)
            .field("path", &self.store.path())
            .finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    /// Creates a gateway over `store`, deriving the schema shapes once.
    ///
    /// # Errors
    ///
    /// Returns an error only if the default document cannot be represented
    /// as JSON.
    pub fn new(store: Box<dyn KeyValueStore>, config: &Config) -> Result<Self> {
        Ok(Self {
            store,
            document_key: config.document_key.clone(),
            preferences_key: config.preferences_key.clone(),
            document_shape: Shape::of::<Document>()?,
            preferences_shape: Shape::of::<Preferences>()?,
        })
    }

    /// Shape of the default document.
    pub fn document_shape(&self) -> &Shape {
        &self.document_shape
    }

    // =========================================================================
    // Document
    // =========================================================================

    /// Loads the document, merged with the schema defaults.
    ///
    /// Never fails: an absent key, a store read error or undecodable bytes
    /// all yield the default document.
    #[instrument(skip(self), fields(key = %self.document_key))]
    pub fn load_document(&self) -> Document {
        match self.read_json(&self.document_key) {
            Some(loaded) => self.decode_document(&loaded),
            None => Document::default(),
        }
    }

    /// Merges an already-parsed value with the defaults and decodes it.
    pub fn decode_document(&self, loaded: &Value) -> Document {
        Document::from_merged(merge(&self.document_shape, loaded))
    }

    /// Writes the whole document in one store write.
    #[instrument(skip_all, fields(key = %self.document_key))]
    pub fn save_document(&self, document: &Document) -> SaveOutcome {
        self.write_json(&self.document_key, document)
    }

    /// Replaces the stored document with a fresh default and returns it.
    #[instrument(skip(self), fields(key = %self.document_key))]
    pub fn reset_document(&self) -> (Document, SaveOutcome) {
        let document = Document::default();
        let outcome = self.save_document(&document);
        (document, outcome)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Loads the preferences, merged with their defaults. Never fails.
    #[instrument(skip(self), fields(key = %self.preferences_key))]
    pub fn load_preferences(&self) -> Preferences {
        match self.read_json(&self.preferences_key) {
            Some(loaded) => self.decode_preferences(&loaded),
            None => Preferences::default(),
        }
    }

    /// Merges an already-parsed value with the preference defaults.
    pub fn decode_preferences(&self, loaded: &Value) -> Preferences {
        Preferences::from_merged(merge(&self.preferences_shape, loaded))
    }

    /// Writes the preferences document.
    #[instrument(skip_all, fields(key = %self.preferences_key))]
    pub fn save_preferences(&self, preferences: &Preferences) -> SaveOutcome {
        self.write_json(&self.preferences_key, preferences)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns the underlying store.
    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Closes the underlying store.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    fn read_json(&self, key: &str) -> Option<Value> {
        let bytes = match self.store.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "No stored value, using defaults");
                return None;
            }
            Err(err) => {
                warn!(key, error = %err, "Store read failed, using defaults");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    key,
                    bytes = bytes.len(),
                    error = %err,
                    "Stored value is not valid JSON, using defaults"
                );
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> SaveOutcome {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "Serialization failed, nothing written");
                return SaveOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let outcome = SaveOutcome::from_write(self.store.set(key, &bytes), bytes.len());
        match &outcome {
            SaveOutcome::Saved { bytes } => debug!(key, bytes, "Saved"),
            SaveOutcome::QuotaExceeded { needed, quota } => {
                warn!(key, needed, quota, "Save refused: quota exceeded")
            }
            SaveOutcome::Failed { reason } => warn!(key, reason = %reason, "Save failed"),
        }
        outcome
    }
}
