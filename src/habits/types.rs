//! Type definitions for the habit tracker.

use serde::{Deserialize, Serialize};

use crate::document::lenient;
use crate::types::RecordId;

/// Icon used when a habit is created without one.
pub const DEFAULT_HABIT_ICON: &str = "🛡️";

/// The `habits` sub-tree of the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Habits {
    /// Tracked habits.
    #[serde(deserialize_with = "lenient::records")]
    pub habits: Vec<Habit>,
    /// One record per (habit, day) marked done.
    #[serde(deserialize_with = "lenient::records")]
    pub logs: Vec<HabitLog>,
}

/// A tracked habit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Habit {
    /// Record id.
    pub id: RecordId,
    /// Display name.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// Emoji icon.
    #[serde(deserialize_with = "lenient::text")]
    pub icon: String,
}

/// A habit marked done on one day.
///
/// First-generation logs carry no `id`; one is assigned on load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitLog {
    /// Record id.
    pub id: RecordId,
    /// Habit reference. May dangle after legacy deletes.
    pub habit_id: RecordId,
    /// Day (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
}

/// Result of [`CodexDB::toggle_habit`](crate::CodexDB::toggle_habit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HabitToggle {
    /// A log was added; the habit is now done for the day.
    Done,
    /// The existing log was removed.
    Undone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_log_without_id_gets_one() {
        let logs: Vec<HabitLog> =
            serde_json::from_str(r#"[{"habitId":"h1","date":"2024-01-01"}]"#).unwrap();
        assert_eq!(logs[0].habit_id, "h1");
        assert!(!logs[0].id.as_str().is_empty());
    }
}
