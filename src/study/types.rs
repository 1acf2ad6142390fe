//! Type definitions for the study log.

use serde::{Deserialize, Serialize};

use crate::document::lenient;
use crate::types::{RecordId, Timestamp};

/// The `study` sub-tree of the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Study {
    /// Subjects being studied.
    #[serde(deserialize_with = "lenient::records")]
    pub subjects: Vec<Subject>,
    /// Logged study sessions.
    #[serde(deserialize_with = "lenient::records")]
    pub sessions: Vec<StudySession>,
    /// Reading list.
    #[serde(deserialize_with = "lenient::records")]
    pub books: Vec<Book>,
    /// Spaced-review items.
    #[serde(deserialize_with = "lenient::records")]
    pub reviews: Vec<ReviewItem>,
    /// Running focus timer, if any.
    #[serde(deserialize_with = "lenient::optional")]
    pub active_timer: Option<ActiveTimer>,
}

/// A study subject.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
    /// Record id.
    pub id: RecordId,
    /// Display name.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// CSS color.
    #[serde(deserialize_with = "lenient::text")]
    pub color: String,
    /// Weekly target in hours.
    #[serde(deserialize_with = "lenient::amount")]
    pub weekly_goal_hours: f64,
}

/// A logged block of study time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudySession {
    /// Record id.
    pub id: RecordId,
    /// Day (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    /// Subject reference. May dangle after the subject is deleted.
    pub subject_id: RecordId,
    /// Minutes studied, > 0.
    #[serde(deserialize_with = "lenient::count")]
    pub duration_min: u32,
    /// What was covered.
    #[serde(deserialize_with = "lenient::text")]
    pub topic: String,
    /// Free-text notes.
    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,
}

/// A book on the reading list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    /// Record id.
    pub id: RecordId,
    /// Title.
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    /// Author.
    #[serde(deserialize_with = "lenient::text")]
    pub author: String,
    /// Page count, > 0.
    #[serde(deserialize_with = "lenient::count")]
    pub total_pages: u32,
    /// Last page read (0..=total_pages).
    #[serde(deserialize_with = "lenient::count")]
    pub current_page: u32,
    /// Optional subject link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<RecordId>,
}

impl Book {
    /// Fraction read, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (f64::from(self.current_page) / f64::from(self.total_pages)).min(1.0)
    }

    /// True once the last page is reached.
    pub fn is_finished(&self) -> bool {
        self.total_pages > 0 && self.current_page >= self.total_pages
    }
}

/// A spaced-review item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewItem {
    /// Record id.
    pub id: RecordId,
    /// What to recall.
    #[serde(deserialize_with = "lenient::text")]
    pub prompt: String,
    /// Optional subject link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<RecordId>,
    /// Current interval in days (>= 1).
    #[serde(deserialize_with = "lenient::count")]
    pub interval_days: u32,
    /// Next due day (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub due_date: String,
    /// Day of the last review, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<String>,
}

/// A running focus timer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveTimer {
    /// Subject being studied.
    pub subject_id: RecordId,
    /// When the timer started.
    pub started_at: Timestamp,
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for [`CodexDB::log_study_session`](crate::CodexDB::log_study_session).
#[derive(Clone, Debug, Default)]
pub struct NewStudySession {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Must reference an existing subject.
    pub subject_id: RecordId,
    /// Minutes, > 0.
    pub duration_min: u32,
    /// What was covered.
    pub topic: String,
    /// Free-text notes.
    pub notes: String,
}

/// Input for [`CodexDB::add_book`](crate::CodexDB::add_book).
#[derive(Clone, Debug, Default)]
pub struct NewBook {
    /// Title, non-empty.
    pub title: String,
    /// Author.
    pub author: String,
    /// Page count, > 0.
    pub total_pages: u32,
    /// Optional subject link (must exist when given).
    pub subject_id: Option<RecordId>,
}

/// Outcome of reviewing an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewGrade {
    /// Recalled: the interval doubles.
    Recalled,
    /// Forgotten: the interval resets to one day.
    Forgotten,
}
