//! Workout log.
//!
//! Sessions hold ordered exercises, exercises hold ordered sets. Exercises
//! submitted with a blank name are dropped rather than rejected, matching
//! how partially filled workout forms behave.

pub mod types;

pub use types::{
    default_workout_types, Exercise, Gym, NewExercise, NewSet, NewWorkout, WorkoutSession,
    WorkoutSet,
};

use crate::db::{CodexDB, Commit};
use crate::error::{NotFoundError, Result, ValidationError};
use crate::storage::schema::{MAX_EXERCISES, MAX_SETS};
use crate::types::RecordId;
use crate::validation::{
    non_negative_amount, optional_label, optional_text, required_date, required_label,
};

fn build_set(set: &NewSet) -> std::result::Result<WorkoutSet, ValidationError> {
    Ok(WorkoutSet {
        id: RecordId::new(),
        reps: set.reps,
        weight: non_negative_amount("weight", set.weight)?,
        note: optional_label("note", &set.note)?,
    })
}

impl CodexDB {
    /// Logs a workout session.
    ///
    /// # Errors
    ///
    /// - `date` is not `YYYY-MM-DD`
    /// - a duration of zero minutes is given
    /// - more than 50 named exercises, or more than 100 sets on one
    /// - a weight is negative or not finite
    pub fn log_workout(&mut self, workout: NewWorkout) -> Result<Commit<RecordId>> {
        let date = required_date("date", &workout.date)?;
        let kind = optional_label("type", &workout.kind)?;
        let notes = optional_text(&workout.notes)?;
        if workout.duration == Some(0) {
            return Err(ValidationError::invalid_field("duration", "must be greater than 0").into());
        }

        let named: Vec<&NewExercise> = workout
            .exercises
            .iter()
            .filter(|e| !e.name.trim().is_empty())
            .collect();
        if named.len() > MAX_EXERCISES {
            return Err(
                ValidationError::too_many_items("exercises", named.len(), MAX_EXERCISES).into(),
            );
        }

        let mut exercises = Vec::with_capacity(named.len());
        for exercise in named {
            if exercise.sets.len() > MAX_SETS {
                return Err(
                    ValidationError::too_many_items("sets", exercise.sets.len(), MAX_SETS).into(),
                );
            }
            exercises.push(Exercise {
                id: RecordId::new(),
                name: required_label("name", &exercise.name)?,
                sets: exercise.sets.iter().map(build_set).collect::<std::result::Result<_, _>>()?,
            });
        }

        let id = RecordId::new();
        self.document_mut().gym.sessions.push(WorkoutSession {
            id: id.clone(),
            date,
            kind,
            duration: workout.duration,
            notes,
            exercises,
        });
        Ok(self.commit(id))
    }

    /// Appends a set to an exercise of a logged session. Returns the set id.
    pub fn add_workout_set(
        &mut self,
        session_id: &RecordId,
        exercise_id: &RecordId,
        set: NewSet,
    ) -> Result<Commit<RecordId>> {
        let set = build_set(&set)?;

        let session = self
            .document_mut()
            .gym
            .sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| NotFoundError::workout(session_id))?;
        let exercise = session
            .exercises
            .iter_mut()
            .find(|e| &e.id == exercise_id)
            .ok_or_else(|| NotFoundError::exercise(exercise_id))?;
        if exercise.sets.len() >= MAX_SETS {
            return Err(
                ValidationError::too_many_items("sets", exercise.sets.len() + 1, MAX_SETS).into(),
            );
        }

        let id = set.id.clone();
        exercise.sets.push(set);
        Ok(self.commit(id))
    }

    /// Deletes a workout session.
    pub fn delete_workout(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let sessions = &mut self.document_mut().gym.sessions;
        let before = sessions.len();
        sessions.retain(|s| &s.id != id);
        if sessions.len() == before {
            return Err(NotFoundError::workout(id).into());
        }
        Ok(self.commit(()))
    }

    /// Adds a selectable workout type.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the type already exists (case-insensitive).
    pub fn add_workout_type(&mut self, name: &str) -> Result<Commit<()>> {
        let name = required_label("name", name)?;
        let exists = self
            .document()
            .gym
            .workout_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&name));
        if exists {
            return Err(
                ValidationError::conflict(format!("workout type '{name}' already exists")).into(),
            );
        }

        self.document_mut().gym.workout_types.push(name);
        Ok(self.commit(()))
    }
}
