//! Journal entries.

pub mod types;

pub use types::{EntryDraft, Journal, JournalEntry};

use crate::db::{CodexDB, Commit};
use crate::error::{NotFoundError, Result, ValidationError};
use crate::storage::schema::{MAX_CONTENT_SIZE, MAX_LABEL_LENGTH, MAX_TAGS};
use crate::types::RecordId;
use crate::validation::{optional_label, required_date};

/// Splits comma-separated tag input into trimmed, non-empty tags.
///
/// ```
/// assert_eq!(codexdb::journal::parse_tags(" gratitude, ,work "), vec!["gratitude", "work"]);
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Validates a draft into the stored fields (date, title, content, mood, tags).
fn validate_draft(draft: &EntryDraft) -> std::result::Result<JournalEntry, ValidationError> {
    let content = draft.content.trim();
    if content.is_empty() {
        return Err(ValidationError::required_field("content"));
    }
    if content.len() > MAX_CONTENT_SIZE {
        return Err(ValidationError::content_too_large(content.len(), MAX_CONTENT_SIZE));
    }

    let mut tags: Vec<String> = Vec::new();
    for tag in draft.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if tag.len() > MAX_LABEL_LENGTH {
            return Err(ValidationError::invalid_field(
                "tags",
                format!("tag exceeds {} bytes", MAX_LABEL_LENGTH),
            ));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::too_many_items("tags", tags.len(), MAX_TAGS));
    }

    Ok(JournalEntry {
        id: RecordId::new(),
        date: required_date("date", &draft.date)?,
        title: optional_label("title", &draft.title)?,
        content: content.to_string(),
        mood: optional_label("mood", &draft.mood)?,
        tags,
    })
}

impl CodexDB {
    /// Writes a new entry.
    ///
    /// # Errors
    ///
    /// Content must be non-empty after trimming (max 100 KB); the date is
    /// required; at most 20 distinct tags.
    pub fn write_entry(&mut self, draft: EntryDraft) -> Result<Commit<RecordId>> {
        let entry = validate_draft(&draft)?;
        let id = entry.id.clone();
        self.document_mut().journal.entries.push(entry);
        Ok(self.commit(id))
    }

    /// Replaces the fields of an existing entry. The id is kept.
    pub fn edit_entry(&mut self, id: &RecordId, draft: EntryDraft) -> Result<Commit<()>> {
        let mut updated = validate_draft(&draft)?;
        let entry = self
            .document_mut()
            .journal
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| NotFoundError::journal_entry(id))?;

        updated.id = entry.id.clone();
        *entry = updated;
        Ok(self.commit(()))
    }

    /// Deletes an entry.
    pub fn delete_entry(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let entries = &mut self.document_mut().journal.entries;
        let before = entries.len();
        entries.retain(|e| &e.id != id);
        if entries.len() == before {
            return Err(NotFoundError::journal_entry(id).into());
        }
        Ok(self.commit(()))
    }

    /// Entries whose title, content or tags contain `query`
    /// (case-insensitive), newest date first.
    ///
    /// An empty query matches every entry.
    pub fn search_entries(&self, query: &str) -> Vec<&JournalEntry> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<&JournalEntry> = self
            .document()
            .journal
            .entries
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.title.to_lowercase().contains(&needle)
                    || e.content.to_lowercase().contains(&needle)
                    || e.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        matches
    }
}
