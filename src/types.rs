//! Core type definitions for record identifiers, timestamps and calendar dates.
//!
//! Record ids are strings: newly generated ids come from UUID v7 (time-ordered
//! prefix, random suffix), but any existing string is accepted when loading so
//! documents written by earlier generations (`"cat1"`, base36 ids) keep working.

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ValidationError;

/// Storage format for calendar dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifier of a record stored in one of the document's arrays.
///
/// Serialized as a bare JSON string. Immutable once assigned.
///
/// # Example
/// ```
/// use codexdb::RecordId;
///
/// let id = RecordId::new();
/// assert!(!id.as_str().is_empty());
/// ```
///
/// Stored ids are read leniently: numeric ids become their text and a
/// `null` id is replaced by a fresh one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh id with a UUID v7 (time-ordered).
    ///
    /// Collisions within one document's lifetime are practically impossible;
    /// ids are never compared across documents.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Wraps an existing id string (legacy ids, ids received from callers).
    #[inline]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    /// Generates a fresh id.
    ///
    /// Used by serde when a stored record has no `id` (first-generation habit
    /// logs, exercises and sets were written without one).
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self(id)),
            Value::Number(n) => Ok(Self(n.to_string())),
            Value::Null => Ok(Self::new()),
            other => Err(de::Error::custom(format!("expected a string id, got {other}"))),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Unix timestamp in milliseconds.
///
/// Using i64 allows representing dates far into the future and past.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    ///
    /// If the system clock is before the Unix epoch (should never happen
    /// in practice), returns a timestamp of 0 (epoch) rather than panicking.
    #[inline]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as i64)
    }

    /// Creates a timestamp from Unix milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as Unix milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Whole minutes elapsed from `self` to `later` (0 if `later` is earlier).
    #[inline]
    pub fn minutes_until(&self, later: Timestamp) -> u32 {
        let millis = (later.0 - self.0).max(0);
        u32::try_from(millis / 60_000).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Today's date (UTC) in storage format.
pub fn today() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` date, reporting failures against `field`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required_field(field));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        ValidationError::invalid_field(field, format!("expected YYYY-MM-DD, got '{trimmed}'"))
    })
}

/// Formats a date in storage format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Month key (`YYYY-MM`) of a stored date string.
///
/// Returns `None` for strings too short to carry a month.
pub fn month_key(date: &str) -> Option<&str> {
    date.get(..7)
}
