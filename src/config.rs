//! Configuration types for codexdb.
//!
//! The [`Config`] struct controls store behavior including:
//! - The reserved storage keys for the document and the preferences
//! - The byte quota (mirrors the host storage quota of the original app)
//! - Durability settings and event channel capacity
//!
//! # Example
//! ```rust
//! use codexdb::{Config, SyncMode};
//!
//! // Use defaults (codex_v1 / codex_config keys, 5 MiB quota)
//! let config = Config::default();
//!
//! // Customize
//! let config = Config {
//!     quota_bytes: None,
//!     sync_mode: SyncMode::Paranoid,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::schema::{
    DEFAULT_DOCUMENT_KEY, DEFAULT_EVENT_CAPACITY, DEFAULT_PREFERENCES_KEY, DEFAULT_QUOTA_BYTES,
    MAX_KEY_LENGTH,
};

/// Store configuration options.
///
/// All fields have sensible defaults. Use struct update syntax to override
/// specific settings:
///
/// ```rust
/// use codexdb::Config;
///
/// let config = Config {
///     document_key: "codex_test".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Storage key holding the serialized document.
    pub document_key: String,

    /// Storage key holding the serialized preferences document.
    pub preferences_key: String,

    /// Maximum bytes the store may hold (keys plus values).
    ///
    /// `None` disables the check. Default: 5 MiB.
    pub quota_bytes: Option<usize>,

    /// Durability mode for write operations.
    pub sync_mode: SyncMode,

    /// Buffered events per subscriber before new events are dropped for it.
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            preferences_key: DEFAULT_PREFERENCES_KEY.to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            sync_mode: SyncMode::Normal,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Config {
    /// Creates a new Config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Config with no storage quota.
    pub fn unlimited() -> Self {
        Self {
            quota_bytes: None,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Called automatically by `CodexDB::open()`.
    ///
    /// # Errors
    /// Returns `ValidationError` if:
    /// - either key is empty or longer than 256 bytes
    /// - both keys are the same
    /// - `quota_bytes` is `Some(0)`
    /// - `event_capacity` is 0
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, key) in [
            ("document_key", &self.document_key),
            ("preferences_key", &self.preferences_key),
        ] {
            if key.trim().is_empty() {
                return Err(ValidationError::required_field(field));
            }
            if key.len() > MAX_KEY_LENGTH {
                return Err(ValidationError::invalid_field(
                    field,
                    format!("must be at most {} bytes, got {}", MAX_KEY_LENGTH, key.len()),
                ));
            }
        }

        if self.document_key == self.preferences_key {
            return Err(ValidationError::invalid_field(
                "preferences_key",
                "must differ from document_key",
            ));
        }

        if self.quota_bytes == Some(0) {
            return Err(ValidationError::invalid_field(
                "quota_bytes",
                "must be greater than 0",
            ));
        }

        if self.event_capacity == 0 {
            return Err(ValidationError::invalid_field(
                "event_capacity",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Durability mode for write operations.
///
/// Controls the trade-off between write performance and crash safety.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Sync to disk on transaction commit.
    ///
    /// This is the default. Every saved document survives a crash.
    #[default]
    Normal,

    /// Async sync (faster writes, may lose recent saves on crash).
    Fast,

    /// Sync with extra integrity checks on every commit.
    Paranoid,
}

impl SyncMode {
    /// Returns true if this mode adds extra integrity checks.
    pub fn is_paranoid(&self) -> bool {
        matches!(self, Self::Paranoid)
    }

    /// Returns true if this mode is async (may lose data on crash).
    pub fn is_fast(&self) -> bool {
        matches!(self, Self::Fast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.document_key, "codex_v1");
        assert_eq!(config.preferences_key, "codex_config");
        assert_eq!(config.quota_bytes, Some(5 * 1024 * 1024));
        assert_eq!(config.sync_mode, SyncMode::Normal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unlimited() {
        let config = Config::unlimited();
        assert!(config.quota_bytes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key() {
        let config = Config {
            document_key: "  ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ValidationError::RequiredField { field } if field == "document_key")
        );
    }

    #[test]
    fn test_validate_same_keys() {
        let config = Config {
            preferences_key: "codex_v1".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_quota() {
        let config = Config {
            quota_bytes: Some(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ValidationError::InvalidField { field, .. } if field == "quota_bytes")
        );
    }

    #[test]
    fn test_validate_zero_event_capacity() {
        let config = Config {
            event_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sync_mode_checks() {
        assert!(!SyncMode::Normal.is_fast());
        assert!(!SyncMode::Normal.is_paranoid());
        assert!(SyncMode::Fast.is_fast());
        assert!(SyncMode::Paranoid.is_paranoid());
    }
}
