//! The persisted document and its schema defaults.
//!
//! The [`Document`] is the single root value persisted under the document
//! key. It has exactly five sub-trees, one per module, and every field of
//! the schema is present in every value of the type.
//!
//! # Load pipeline
//!
//! ```text
//! raw bytes ──serde_json──▶ Value ──merge(shape)──▶ Value ──decode──▶ Document
//!     │ absent / invalid JSON                            │ record fails
//!     └──────────────▶ Document::default()               └──▶ that record is dropped
//! ```
//!
//! Decoding is per record. Legacy field values (`null`, negative counts,
//! numbers stored as strings) are repaired by the [`lenient`] decoders, and
//! a record that still cannot be read is dropped with a warning while its
//! siblings load. A section that fails as a whole falls back to its default.

pub mod lenient;
pub mod merge;
pub mod shape;

pub use merge::{merge, merge_values};
pub use shape::Shape;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::gym::Gym;
use crate::habits::Habits;
use crate::journal::Journal;
use crate::study::Study;
use crate::treasury::Treasury;

/// Root of the persisted state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Finance ledger.
    pub treasury: Treasury,
    /// Habit tracker.
    pub habits: Habits,
    /// Workout log.
    pub gym: Gym,
    /// Study log.
    pub study: Study,
    /// Journal.
    pub journal: Journal,
}

/// Top-level keys of the document, in declaration order.
pub const SECTIONS: [&str; 5] = ["treasury", "habits", "gym", "study", "journal"];

/// Returns a fresh default document.
///
/// Each call returns an independent value; mutating one never affects
/// another.
pub fn default_document() -> Document {
    Document::default()
}

impl Document {
    /// Decodes a merged value into a typed document.
    ///
    /// Sections that fail to decode fall back to their defaults and are
    /// reported with a warning. A non-object value yields the default
    /// document.
    pub fn from_merged(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                warn!(
                    kind = %lenient::kind(&other),
                    "Document root is not an object, using defaults"
                );
                return Self::default();
            }
        };

        Self {
            treasury: decode_section(&mut map, "treasury"),
            habits: decode_section(&mut map, "habits"),
            gym: decode_section(&mut map, "gym"),
            study: decode_section(&mut map, "study"),
            journal: decode_section(&mut map, "journal"),
        }
    }

    /// Total number of records across all arrays of the document.
    pub fn record_count(&self) -> usize {
        let t = &self.treasury;
        t.transactions.len()
            + t.categories.len()
            + t.gold_entries.len()
            + t.budgets.len()
            + t.goals.len()
            + self.habits.habits.len()
            + self.habits.logs.len()
            + self.gym.sessions.len()
            + self.study.subjects.len()
            + self.study.sessions.len()
            + self.study.books.len()
            + self.study.reviews.len()
            + self.journal.entries.len()
    }
}

fn decode_section<T>(map: &mut Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = map.remove(key) else {
        return T::default();
    };
    serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(section = key, error = %err, "Section failed to decode, using defaults");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_document_has_exactly_the_five_sections() {
        let value = serde_json::to_value(default_document()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        let mut expected = SECTIONS.to_vec();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_default_document_is_fresh_each_call() {
        let mut a = default_document();
        a.treasury.categories.clear();
        let b = default_document();
        assert_eq!(b.treasury.categories.len(), 9);
    }

    #[test]
    fn test_default_shape_uses_persisted_names() {
        let shape = Shape::of::<Document>().unwrap();
        let treasury = shape.field("treasury").unwrap();
        assert!(treasury.field("goldEntries").unwrap().is_array());
        assert_eq!(treasury.field("cachedGoldPrice"), Some(&Shape::Scalar(Value::Null)));
        assert!(shape.field("gym").unwrap().field("workoutTypes").is_some());
        assert_eq!(
            shape.field("study").unwrap().field("activeTimer"),
            Some(&Shape::Scalar(Value::Null))
        );
    }

    #[test]
    fn test_from_merged_drops_only_the_unreadable_record() {
        let shape = Shape::of::<Document>().unwrap();
        let loaded = json!({
            "journal": { "entries": [{ "id": "a", "date": "2024-01-01", "mood": null }] },
            "gym": {
                "sessions": [
                    { "id": "s1", "exercises": "not a list" },
                    "garbage",
                    { "id": "s2", "duration": -10,
                      "exercises": [{ "name": "Row", "sets": [{ "reps": -5, "weight": "40" }] }] },
                ],
                "workoutTypes": ["Push", 7, "Custom"],
            },
        });
        let doc = Document::from_merged(merge(&shape, &loaded));

        assert_eq!(doc.journal.entries.len(), 1);
        assert_eq!(doc.journal.entries[0].id, "a");
        assert_eq!(doc.journal.entries[0].mood, "");
        assert_eq!(doc.gym.workout_types, vec!["Push", "Custom"]);

        let ids: Vec<&str> = doc.gym.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert!(doc.gym.sessions[0].exercises.is_empty());
        assert_eq!(doc.gym.sessions[1].duration, None);
        let set = &doc.gym.sessions[1].exercises[0].sets[0];
        assert_eq!(set.reps, 0);
        assert_eq!(set.weight, 40.0);
    }

    #[test]
    fn test_from_merged_section_of_wrong_type_uses_default() {
        let doc = Document::from_merged(json!({ "habits": "oops", "gym": {} }));
        assert!(doc.habits.habits.is_empty());
        assert_eq!(doc.gym.workout_types.len(), 8);
    }

    #[test]
    fn test_from_merged_non_object() {
        assert_eq!(Document::from_merged(json!([1, 2])), Document::default());
    }

    #[test]
    fn test_record_count() {
        let doc = default_document();
        assert_eq!(doc.record_count(), 9);
    }
}
