//! Habit tracker.
//!
//! A habit is done on a day when a log record for (habit, day) exists;
//! toggling adds or removes that record. At most one log exists per
//! (habit, day).

pub mod types;

pub use types::{Habit, HabitLog, HabitToggle, Habits, DEFAULT_HABIT_ICON};

use tracing::debug;

use crate::db::{CodexDB, Commit};
use crate::error::{NotFoundError, Result};
use crate::types::{format_date, parse_date, RecordId};
use crate::validation::{optional_label, required_date, required_label};

impl CodexDB {
    /// Adds a habit. An empty icon becomes the default shield.
    pub fn add_habit(&mut self, name: &str, icon: &str) -> Result<Commit<RecordId>> {
        let name = required_label("name", name)?;
        let icon = optional_label("icon", icon)?;

        let id = RecordId::new();
        self.document_mut().habits.habits.push(Habit {
            id: id.clone(),
            name,
            icon: if icon.is_empty() {
                DEFAULT_HABIT_ICON.to_string()
            } else {
                icon
            },
        });
        Ok(self.commit(id))
    }

    /// Deletes a habit and all of its logs.
    pub fn delete_habit(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let habits = &mut self.document_mut().habits;
        let before = habits.habits.len();
        habits.habits.retain(|h| &h.id != id);
        if habits.habits.len() == before {
            return Err(NotFoundError::habit(id).into());
        }
        habits.logs.retain(|l| &l.habit_id != id);
        Ok(self.commit(()))
    }

    /// Marks a habit done on `date`, or undoes it if it already was.
    ///
    /// # Errors
    ///
    /// The habit must exist and `date` must be `YYYY-MM-DD`.
    pub fn toggle_habit(&mut self, id: &RecordId, date: &str) -> Result<Commit<HabitToggle>> {
        let date = required_date("date", date)?;
        if !self.document().habits.habits.iter().any(|h| &h.id == id) {
            return Err(NotFoundError::habit(id).into());
        }

        let logs = &mut self.document_mut().habits.logs;
        let before = logs.len();
        logs.retain(|l| !(&l.habit_id == id && l.date == date));

        let toggle = if logs.len() < before {
            HabitToggle::Undone
        } else {
            logs.push(HabitLog {
                id: RecordId::new(),
                habit_id: id.clone(),
                date,
            });
            HabitToggle::Done
        };

        debug!(habit = %id, ?toggle, "Habit toggled");
        Ok(self.commit(toggle))
    }

    /// Whether a habit is logged on `date`.
    pub fn is_habit_done(&self, id: &RecordId, date: &str) -> bool {
        self.document()
            .habits
            .logs
            .iter()
            .any(|l| &l.habit_id == id && l.date == date)
    }

    /// Consecutive logged days ending at `as_of` (inclusive).
    ///
    /// Returns 0 when `as_of` itself is not logged or is not a valid date.
    pub fn habit_streak(&self, id: &RecordId, as_of: &str) -> u32 {
        let Ok(mut day) = parse_date("as_of", as_of) else {
            return 0;
        };

        let mut streak = 0;
        while self.is_habit_done(id, &format_date(day)) {
            streak += 1;
            match day.pred_opt() {
                Some(previous) => day = previous,
                None => break,
            }
        }
        streak
    }

    /// Resolves a habit id to its name ("Unknown" when dangling).
    pub fn habit_label(&self, id: &RecordId) -> String {
        self.document()
            .habits
            .habits
            .iter()
            .find(|h| &h.id == id)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStore;

    fn open() -> CodexDB {
        CodexDB::open_with_store(Box::new(MemoryStore::new()), Config::default()).unwrap()
    }

    #[test]
    fn test_add_habit_defaults_icon() {
        let mut db = open();
        let id = db.add_habit("  Read ", "").unwrap().value;
        let habit = &db.document().habits.habits[0];
        assert_eq!(habit.id, id);
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.icon, DEFAULT_HABIT_ICON);

        assert!(db.add_habit(" ", "x").unwrap_err().is_validation());
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut db = open();
        let id = db.add_habit("Pray", "🕌").unwrap().value;

        assert_eq!(db.toggle_habit(&id, "2024-01-05").unwrap().value, HabitToggle::Done);
        assert!(db.is_habit_done(&id, "2024-01-05"));
        assert_eq!(db.toggle_habit(&id, "2024-01-05").unwrap().value, HabitToggle::Undone);
        assert!(!db.is_habit_done(&id, "2024-01-05"));
        assert!(db.document().habits.logs.is_empty());
    }

    #[test]
    fn test_toggle_unknown_habit() {
        let mut db = open();
        let err = db.toggle_habit(&RecordId::from("nope"), "2024-01-05").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_streak_counts_back_from_as_of() {
        let mut db = open();
        let id = db.add_habit("Walk", "").unwrap().value;
        for day in ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"] {
            let _ = db.toggle_habit(&id, day).unwrap();
        }
        let _ = db.toggle_habit(&id, "2024-02-25").unwrap();

        assert_eq!(db.habit_streak(&id, "2024-03-01"), 4);
        assert_eq!(db.habit_streak(&id, "2024-02-28"), 2);
        assert_eq!(db.habit_streak(&id, "2024-03-02"), 0);
        assert_eq!(db.habit_streak(&id, "garbage"), 0);
    }

    #[test]
    fn test_delete_habit_cascades_logs() {
        let mut db = open();
        let keep = db.add_habit("Keep", "").unwrap().value;
        let drop = db.add_habit("Drop", "").unwrap().value;
        let _ = db.toggle_habit(&keep, "2024-01-01").unwrap();
        let _ = db.toggle_habit(&drop, "2024-01-01").unwrap();

        let _ = db.delete_habit(&drop).unwrap();
        let logs = &db.document().habits.logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].habit_id, keep);
        assert_eq!(db.habit_label(&drop), "Unknown");
    }
}
