//! Type definitions for the workout log.

use serde::{Deserialize, Serialize};

use crate::document::lenient;
use crate::types::RecordId;

/// The `gym` sub-tree of the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gym {
    /// Logged workout sessions.
    #[serde(deserialize_with = "lenient::records")]
    pub sessions: Vec<WorkoutSession>,
    /// Selectable session types. Seeded.
    #[serde(deserialize_with = "lenient::records")]
    pub workout_types: Vec<String>,
}

impl Default for Gym {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            workout_types: default_workout_types(),
        }
    }
}

/// The seeded workout types.
pub fn default_workout_types() -> Vec<String> {
    [
        "Push",
        "Pull",
        "Legs",
        "Cardio",
        "Upper",
        "Lower",
        "Full Body",
        "Rest",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// A logged workout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutSession {
    /// Record id.
    pub id: RecordId,
    /// Day (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    /// Session type, usually one of `workoutTypes`.
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: String,
    /// Duration in minutes, if recorded.
    #[serde(deserialize_with = "lenient::optional_count")]
    pub duration: Option<u32>,
    /// Free-text notes.
    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,
    /// Exercises performed, in order.
    #[serde(deserialize_with = "lenient::records")]
    pub exercises: Vec<Exercise>,
}

impl WorkoutSession {
    /// Total number of sets across all exercises.
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Sum of `reps * weight` over all sets.
    pub fn volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(|s| f64::from(s.reps) * s.weight)
            .sum()
    }
}

/// One exercise within a session.
///
/// First-generation exercises carry no `id`; one is assigned on load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    /// Record id.
    pub id: RecordId,
    /// Exercise name.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// Sets in order.
    #[serde(deserialize_with = "lenient::records")]
    pub sets: Vec<WorkoutSet>,
}

/// One set of an exercise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutSet {
    /// Record id.
    pub id: RecordId,
    /// Repetitions. Negative legacy values read as 0.
    #[serde(deserialize_with = "lenient::count")]
    pub reps: u32,
    /// Weight (unit chosen by the user).
    #[serde(deserialize_with = "lenient::amount")]
    pub weight: f64,
    /// Free-text note.
    #[serde(deserialize_with = "lenient::text")]
    pub note: String,
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for [`CodexDB::log_workout`](crate::CodexDB::log_workout).
#[derive(Clone, Debug, Default)]
pub struct NewWorkout {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Session type.
    pub kind: String,
    /// Duration in minutes.
    pub duration: Option<u32>,
    /// Free-text notes.
    pub notes: String,
    /// Exercises. Entries with a blank name are dropped.
    pub exercises: Vec<NewExercise>,
}

/// An exercise inside a [`NewWorkout`].
#[derive(Clone, Debug, Default)]
pub struct NewExercise {
    /// Exercise name.
    pub name: String,
    /// Sets.
    pub sets: Vec<NewSet>,
}

/// A set inside a [`NewExercise`] or passed to
/// [`CodexDB::add_workout_set`](crate::CodexDB::add_workout_set).
#[derive(Clone, Debug, Default)]
pub struct NewSet {
    /// Repetitions.
    pub reps: u32,
    /// Weight, finite and >= 0.
    pub weight: f64,
    /// Free-text note.
    pub note: String,
}
