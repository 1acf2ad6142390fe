//! Backup file format.
//!
//! An export is a JSON object:
//!
//! ```text
//! {
//!   "app": "codex",
//!   "exportedAt": "2024-05-01T08:30:00+00:00",
//!   "data":   { ...Document... },      required
//!   "config": { ...Preferences... }    optional
//! }
//! ```
//!
//! Importing runs `data` (and `config`, when present) through the same merge
//! as a normal load, so partial or older exports are accepted and defaulted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, StorageError, ValidationError};
use crate::preferences::Preferences;

/// Value of the `app` field written by [`ExportBundle::new`].
pub const EXPORT_APP_NAME: &str = "codex";

/// A parsed or to-be-written backup file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    /// Producing application.
    #[serde(default)]
    pub app: String,
    /// RFC 3339 export time.
    #[serde(default)]
    pub exported_at: String,
    /// The document, possibly partial.
    pub data: Value,
    /// The preferences, possibly partial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl ExportBundle {
    /// Builds a bundle from the live state.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if either value cannot be represented
    /// as JSON.
    pub fn new(document: &Document, preferences: &Preferences) -> Result<Self> {
        Ok(Self {
            app: EXPORT_APP_NAME.to_string(),
            exported_at: Utc::now().to_rfc3339(),
            data: serde_json::to_value(document).map_err(StorageError::from)?,
            config: Some(serde_json::to_value(preferences).map_err(StorageError::from)?),
        })
    }

    /// Serializes the bundle as pretty-printed JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self).map_err(StorageError::from)?)
    }

    /// Parses a backup file.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the bytes are not a JSON object, or if
    /// `data` is missing or not an object. A non-object `config` is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|err| {
            ValidationError::invalid_field("backup", format!("not valid JSON: {err}"))
        })?;

        let Value::Object(mut map) = value else {
            return Err(ValidationError::invalid_field("backup", "must be a JSON object").into());
        };

        let data = match map.remove("data") {
            None | Some(Value::Null) => return Err(ValidationError::required_field("data").into()),
            Some(data @ Value::Object(_)) => data,
            Some(_) => {
                return Err(ValidationError::invalid_field("data", "must be an object").into())
            }
        };

        let config = match map.remove("config") {
            Some(config @ Value::Object(_)) => Some(config),
            _ => None,
        };

        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            app: text("app"),
            exported_at: text("exportedAt"),
            data,
            config,
        })
    }
}
