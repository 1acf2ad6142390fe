//! Study log.
//!
//! Subjects with weekly hour goals, logged study sessions, a single running
//! focus timer, a reading list and spaced-review items.
//!
//! # Spaced review
//!
//! Each review item carries an interval in days. Recalling it doubles the
//! interval; forgetting it resets the interval to one day. The next due date
//! is the review day plus the interval.

pub mod types;

pub use types::{
    ActiveTimer, Book, NewBook, NewStudySession, ReviewGrade, ReviewItem, Study, StudySession,
    Subject,
};

use chrono::{Days, NaiveDate};
use tracing::{debug, instrument};

use crate::db::{CodexDB, Commit};
use crate::error::{NotFoundError, Result, ValidationError};
use crate::types::{format_date, parse_date, today, RecordId, Timestamp};
use crate::validation::{
    non_negative_amount, optional_label, optional_text, required_date, required_label,
};

/// Label shown for a session whose subject no longer exists.
pub const FALLBACK_SUBJECT_LABEL: &str = "Unknown";

/// Longest review interval, in days.
pub const MAX_REVIEW_INTERVAL_DAYS: u32 = 365;

/// Study minutes for one subject over a seven-day window.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyProgress {
    /// Subject id.
    pub subject_id: RecordId,
    /// Subject name.
    pub name: String,
    /// Minutes logged in the window.
    pub minutes: u32,
    /// Weekly goal in minutes.
    pub goal_minutes: u32,
}

impl WeeklyProgress {
    /// Fraction of the goal reached, capped at 1.0 (0.0 without a goal).
    pub fn ratio(&self) -> f64 {
        if self.goal_minutes == 0 {
            return 0.0;
        }
        (f64::from(self.minutes) / f64::from(self.goal_minutes)).min(1.0)
    }
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

impl CodexDB {
    // =========================================================================
    // Subjects
    // =========================================================================

    /// Adds a subject with a weekly goal in hours (0 for none).
    pub fn add_subject(
        &mut self,
        name: &str,
        color: &str,
        weekly_goal_hours: f64,
    ) -> Result<Commit<RecordId>> {
        let name = required_label("name", name)?;
        let color = optional_label("color", color)?;
        let weekly_goal_hours = non_negative_amount("weeklyGoalHours", weekly_goal_hours)?;

        let id = RecordId::new();
        self.document_mut().study.subjects.push(Subject {
            id: id.clone(),
            name,
            color,
            weekly_goal_hours,
        });
        Ok(self.commit(id))
    }

    /// Deletes a subject.
    ///
    /// Sessions, books and review items keep their (now dangling) reference
    /// and resolve to "Unknown". A timer running on the subject is cancelled.
    pub fn delete_subject(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let study = &mut self.document_mut().study;
        let before = study.subjects.len();
        study.subjects.retain(|s| &s.id != id);
        if study.subjects.len() == before {
            return Err(NotFoundError::subject(id).into());
        }
        if study.active_timer.as_ref().is_some_and(|t| &t.subject_id == id) {
            study.active_timer = None;
        }
        Ok(self.commit(()))
    }

    /// Resolves a subject id to its name ("Unknown" when dangling).
    pub fn subject_label(&self, id: &RecordId) -> String {
        self.find_subject(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| FALLBACK_SUBJECT_LABEL.to_string())
    }

    fn find_subject(&self, id: &RecordId) -> Option<&Subject> {
        self.document().study.subjects.iter().find(|s| &s.id == id)
    }

    fn require_subject(&self, id: &RecordId) -> Result<()> {
        match self.find_subject(id) {
            Some(_) => Ok(()),
            None => Err(NotFoundError::subject(id).into()),
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Logs a study session.
    ///
    /// # Errors
    ///
    /// The subject must exist, the duration must be > 0 and the date valid.
    #[instrument(
        skip(self, session),
        fields(subject = %session.subject_id, minutes = session.duration_min)
    )]
    pub fn log_study_session(&mut self, session: NewStudySession) -> Result<Commit<RecordId>> {
        if session.duration_min == 0 {
            return Err(
                ValidationError::invalid_field("durationMin", "must be greater than 0").into(),
            );
        }
        let date = required_date("date", &session.date)?;
        let topic = optional_label("topic", &session.topic)?;
        let notes = optional_text(&session.notes)?;
        self.require_subject(&session.subject_id)?;

        let id = RecordId::new();
        self.document_mut().study.sessions.push(StudySession {
            id: id.clone(),
            date,
            subject_id: session.subject_id,
            duration_min: session.duration_min,
            topic,
            notes,
        });
        Ok(self.commit(id))
    }

    /// Deletes a study session.
    pub fn delete_study_session(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let sessions = &mut self.document_mut().study.sessions;
        let before = sessions.len();
        sessions.retain(|s| &s.id != id);
        if sessions.len() == before {
            return Err(NotFoundError::study_session(id).into());
        }
        Ok(self.commit(()))
    }

    /// Minutes per subject over the seven days ending at `as_of` (inclusive).
    ///
    /// One row per subject, in subject order. Sessions whose subject no
    /// longer exists are not counted.
    pub fn weekly_study_minutes(&self, as_of: &str) -> Result<Vec<WeeklyProgress>> {
        let end = parse_date("as_of", as_of)?;
        let start = end.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN);
        let study = &self.document().study;

        let in_window = |date: &str| {
            NaiveDate::parse_from_str(date, crate::types::DATE_FORMAT)
                .map(|d| d >= start && d <= end)
                .unwrap_or(false)
        };

        Ok(study
            .subjects
            .iter()
            .map(|subject| {
                let minutes = study
                    .sessions
                    .iter()
                    .filter(|s| s.subject_id == subject.id && in_window(&s.date))
                    .map(|s| s.duration_min)
                    .fold(0u32, u32::saturating_add);
                WeeklyProgress {
                    subject_id: subject.id.clone(),
                    name: subject.name.clone(),
                    minutes,
                    goal_minutes: (subject.weekly_goal_hours * 60.0).round() as u32,
                }
            })
            .collect())
    }

    // =========================================================================
    // Focus timer
    // =========================================================================

    /// Starts the focus timer on a subject.
    ///
    /// # Errors
    ///
    /// The subject must exist and no timer may be running.
    pub fn start_study_timer(&mut self, subject_id: &RecordId) -> Result<Commit<Timestamp>> {
        self.require_subject(subject_id)?;
        if self.document().study.active_timer.is_some() {
            return Err(ValidationError::conflict("a study timer is already running").into());
        }

        let started_at = Timestamp::now();
        self.document_mut().study.active_timer = Some(ActiveTimer {
            subject_id: subject_id.clone(),
            started_at,
        });
        Ok(self.commit(started_at))
    }

    /// Stops the running timer and logs the elapsed whole minutes as a
    /// session dated today.
    ///
    /// Returns the new session id, or `None` if less than a minute elapsed
    /// (the timer is cleared either way). A timer whose subject has since
    /// been deleted is cleared without logging.
    pub fn stop_study_timer(&mut self, topic: &str) -> Result<Commit<Option<RecordId>>> {
        let topic = optional_label("topic", topic)?;
        let Some(timer) = self.document().study.active_timer.clone() else {
            return Err(ValidationError::conflict("no study timer is running").into());
        };

        let minutes = timer.started_at.minutes_until(Timestamp::now());
        let subject_exists = self.find_subject(&timer.subject_id).is_some();

        let study = &mut self.document_mut().study;
        study.active_timer = None;

        let logged = if minutes > 0 && subject_exists {
            let id = RecordId::new();
            study.sessions.push(StudySession {
                id: id.clone(),
                date: today(),
                subject_id: timer.subject_id,
                duration_min: minutes,
                topic,
                notes: String::new(),
            });
            Some(id)
        } else {
            None
        };

        debug!(minutes, logged = logged.is_some(), "Study timer stopped");
        Ok(self.commit(logged))
    }

    /// Discards the running timer without logging anything.
    pub fn cancel_study_timer(&mut self) -> Result<Commit<()>> {
        if self.document_mut().study.active_timer.take().is_none() {
            return Err(ValidationError::conflict("no study timer is running").into());
        }
        Ok(self.commit(()))
    }

    // =========================================================================
    // Reading list
    // =========================================================================

    /// Adds a book to the reading list.
    pub fn add_book(&mut self, book: NewBook) -> Result<Commit<RecordId>> {
        let title = required_label("title", &book.title)?;
        let author = optional_label("author", &book.author)?;
        if book.total_pages == 0 {
            return Err(
                ValidationError::invalid_field("totalPages", "must be greater than 0").into(),
            );
        }
        if let Some(subject_id) = &book.subject_id {
            self.require_subject(subject_id)?;
        }

        let id = RecordId::new();
        self.document_mut().study.books.push(Book {
            id: id.clone(),
            title,
            author,
            total_pages: book.total_pages,
            current_page: 0,
            subject_id: book.subject_id,
        });
        Ok(self.commit(id))
    }

    /// Sets the current page of a book. Returns true once it is finished.
    pub fn update_book_progress(
        &mut self,
        id: &RecordId,
        current_page: u32,
    ) -> Result<Commit<bool>> {
        let book = self
            .document_mut()
            .study
            .books
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| NotFoundError::book(id))?;
        if current_page > book.total_pages {
            return Err(ValidationError::invalid_field(
                "currentPage",
                format!("must be at most {}, got {}", book.total_pages, current_page),
            )
            .into());
        }

        book.current_page = current_page;
        let finished = book.is_finished();
        Ok(self.commit(finished))
    }

    /// Deletes a book.
    pub fn delete_book(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let books = &mut self.document_mut().study.books;
        let before = books.len();
        books.retain(|b| &b.id != id);
        if books.len() == before {
            return Err(NotFoundError::book(id).into());
        }
        Ok(self.commit(()))
    }

    // =========================================================================
    // Spaced review
    // =========================================================================

    /// Adds a review item created on `created_on`; it is first due the next
    /// day.
    pub fn add_review_item(
        &mut self,
        prompt: &str,
        subject_id: Option<&RecordId>,
        created_on: &str,
    ) -> Result<Commit<RecordId>> {
        let prompt = required_label("prompt", prompt)?;
        let created = parse_date("created_on", created_on)?;
        if let Some(subject_id) = subject_id {
            self.require_subject(subject_id)?;
        }

        let id = RecordId::new();
        self.document_mut().study.reviews.push(ReviewItem {
            id: id.clone(),
            prompt,
            subject_id: subject_id.cloned(),
            interval_days: 1,
            due_date: format_date(add_days(created, 1)),
            last_reviewed: None,
        });
        Ok(self.commit(id))
    }

    /// Records a review on `reviewed_on` and reschedules the item.
    ///
    /// Returns the next due date.
    pub fn record_review(
        &mut self,
        id: &RecordId,
        grade: ReviewGrade,
        reviewed_on: &str,
    ) -> Result<Commit<String>> {
        let reviewed = parse_date("reviewed_on", reviewed_on)?;

        let item = self
            .document_mut()
            .study
            .reviews
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| NotFoundError::review_item(id))?;

        item.interval_days = match grade {
            ReviewGrade::Recalled => item
                .interval_days
                .max(1)
                .saturating_mul(2)
                .min(MAX_REVIEW_INTERVAL_DAYS),
            ReviewGrade::Forgotten => 1,
        };
        item.due_date = format_date(add_days(reviewed, item.interval_days));
        item.last_reviewed = Some(format_date(reviewed));

        let due = item.due_date.clone();
        Ok(self.commit(due))
    }

    /// Deletes a review item.
    pub fn delete_review_item(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let reviews = &mut self.document_mut().study.reviews;
        let before = reviews.len();
        reviews.retain(|r| &r.id != id);
        if reviews.len() == before {
            return Err(NotFoundError::review_item(id).into());
        }
        Ok(self.commit(()))
    }

    /// Review items due on or before `as_of`, earliest first.
    ///
    /// Items with an unparseable due date are treated as due.
    pub fn due_reviews(&self, as_of: &str) -> Result<Vec<&ReviewItem>> {
        let as_of = parse_date("as_of", as_of)?;
        let due_on = |item: &ReviewItem| {
            NaiveDate::parse_from_str(&item.due_date, crate::types::DATE_FORMAT)
                .unwrap_or(NaiveDate::MIN)
        };

        let mut due: Vec<&ReviewItem> = self
            .document()
            .study
            .reviews
            .iter()
            .filter(|item| due_on(item) <= as_of)
            .collect();
        due.sort_by_key(|item| due_on(item));
        Ok(due)
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

    fn session(subject: &RecordId, date: &str, minutes: u32) -> NewStudySession {
        NewStudySession {
            date: date.into(),
            subject_id: subject.clone(),
            duration_min: minutes,
            topic: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_log_session_requires_existing_subject_and_duration() {
        let mut db = open();
        let math = db.add_subject("Math", "#3498db", 5.0).unwrap().value;

        let err = db
            .log_study_session(session(&RecordId::from("ghost"), "2024-01-01", 30))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = db.log_study_session(session(&math, "2024-01-01", 0)).unwrap_err();
        assert!(err.is_validation());

        let _ = db.log_study_session(session(&math, "2024-01-01", 30)).unwrap();
        assert_eq!(db.document().study.sessions.len(), 1);
    }

    #[test]
    fn test_weekly_minutes_window() {
        let mut db = open();
        let math = db.add_subject("Math", "", 2.0).unwrap().value;
        let _ = db.log_study_session(session(&math, "2024-03-10", 40)).unwrap();
        let _ = db.log_study_session(session(&math, "2024-03-04", 20)).unwrap();
        let _ = db.log_study_session(session(&math, "2024-03-03", 99)).unwrap();

        let weekly = db.weekly_study_minutes("2024-03-10").unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].minutes, 60);
        assert_eq!(weekly[0].goal_minutes, 120);
        assert_eq!(weekly[0].ratio(), 0.5);
    }

    #[test]
    fn test_deleted_subject_resolves_to_unknown() {
        let mut db = open();
        let math = db.add_subject("Math", "", 0.0).unwrap().value;
        let _ = db.log_study_session(session(&math, "2024-01-01", 30)).unwrap();
        let _ = db.delete_subject(&math).unwrap();

        let subject_id = db.document().study.sessions[0].subject_id.clone();
        assert_eq!(db.subject_label(&subject_id), "Unknown");
        assert!(db.weekly_study_minutes("2024-01-01").unwrap().is_empty());
    }

    #[test]
    fn test_timer_lifecycle() {
        let mut db = open();
        let math = db.add_subject("Math", "", 0.0).unwrap().value;

        let _ = db.start_study_timer(&math).unwrap();
        assert!(db.start_study_timer(&math).unwrap_err().is_validation());

        // Pretend the timer started 25 minutes ago.
        let _ = db
            .mutate(|doc| {
                if let Some(timer) = doc.study.active_timer.as_mut() {
                    timer.started_at =
                        Timestamp::from_millis(timer.started_at.as_millis() - 25 * 60_000);
                }
                Ok(())
            })
            .unwrap();

        let logged = db.stop_study_timer("Limits").unwrap().value;
        assert!(logged.is_some());
        let logged_session = &db.document().study.sessions[0];
        assert_eq!(logged_session.duration_min, 25);
        assert_eq!(logged_session.topic, "Limits");
        assert!(db.document().study.active_timer.is_none());
        assert!(db.stop_study_timer("").unwrap_err().is_validation());
    }

    #[test]
    fn test_cancel_timer_logs_nothing() {
        let mut db = open();
        let math = db.add_subject("Math", "", 0.0).unwrap().value;
        let _ = db.start_study_timer(&math).unwrap();
        let _ = db.cancel_study_timer().unwrap();
        assert!(db.document().study.active_timer.is_none());
        assert!(db.document().study.sessions.is_empty());
        assert!(db.cancel_study_timer().unwrap_err().is_validation());
    }

    #[test]
    fn test_book_progress() {
        let mut db = open();
        let id = db
            .add_book(NewBook {
                title: "SICP".into(),
                author: "Abelson".into(),
                total_pages: 300,
                subject_id: None,
            })
            .unwrap()
            .value;

        assert!(!db.update_book_progress(&id, 120).unwrap().value);
        assert!(db.update_book_progress(&id, 301).unwrap_err().is_validation());
        assert!(db.update_book_progress(&id, 300).unwrap().value);
        let _ = db.delete_book(&id).unwrap();
        assert!(db.document().study.books.is_empty());
    }

    #[test]
    fn test_review_scheduling() {
        let mut db = open();
        let id = db.add_review_item("Define a monad", None, "2024-01-01").unwrap().value;
        assert_eq!(db.document().study.reviews[0].due_date, "2024-01-02");

        let mut review = |grade, day| db.record_review(&id, grade, day).unwrap().value;
        assert_eq!(review(ReviewGrade::Recalled, "2024-01-02"), "2024-01-04");
        assert_eq!(review(ReviewGrade::Recalled, "2024-01-04"), "2024-01-08");
        assert_eq!(review(ReviewGrade::Forgotten, "2024-01-08"), "2024-01-09");
        assert_eq!(
            db.document().study.reviews[0].last_reviewed.as_deref(),
            Some("2024-01-08")
        );
    }

    #[test]
    fn test_due_reviews_sorted() {
        let mut db = open();
        let late = db.add_review_item("late", None, "2024-01-05").unwrap().value;
        let early = db.add_review_item("early", None, "2024-01-01").unwrap().value;
        let _ = db.add_review_item("future", None, "2024-02-01").unwrap();

        let due = db.due_reviews("2024-01-10").unwrap();
        let ids: Vec<&RecordId> = due.iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&early, &late]);
        assert!(db.due_reviews("bad").is_err());
    }
}
