//! Type definitions for the journal.

use serde::{Deserialize, Serialize};

use crate::document::lenient;
use crate::types::RecordId;

/// The `journal` sub-tree of the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Journal {
    /// Entries in insertion order.
    #[serde(deserialize_with = "lenient::records")]
    pub entries: Vec<JournalEntry>,
}

/// A journal entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalEntry {
    /// Record id.
    pub id: RecordId,
    /// Day (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    /// Optional title (may be empty).
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    /// Body text, non-empty.
    #[serde(deserialize_with = "lenient::text")]
    pub content: String,
    /// Mood id; empty when none was picked (stored `null` reads as empty).
    #[serde(deserialize_with = "lenient::text")]
    pub mood: String,
    /// Tags, trimmed and non-empty.
    #[serde(deserialize_with = "lenient::records")]
    pub tags: Vec<String>,
}

/// Input for [`CodexDB::write_entry`](crate::CodexDB::write_entry) and
/// [`CodexDB::edit_entry`](crate::CodexDB::edit_entry).
#[derive(Clone, Debug, Default)]
pub struct EntryDraft {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Mood id or empty.
    pub mood: String,
    /// Tags (see [`parse_tags`](crate::journal::parse_tags)).
    pub tags: Vec<String>,
}
