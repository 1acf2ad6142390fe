//! # codexdb
//!
//! Local persistent document store for a personal life-tracking app.
//!
//! codexdb keeps one JSON document (finance, habits, workouts, study and
//! journal) plus a small preferences document in a durable key-value store.
//! Every load merges what was stored with the current schema's defaults, so
//! documents written by older app generations keep working and pick up new
//! fields automatically.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use codexdb::{CodexDB, Config, NewTransaction, TransactionKind};
//!
//! // Open or create a store
//! let mut db = CodexDB::open("./codex.db", Config::default())?;
//!
//! // Record an expense against a seeded category
//! let food = db.document().treasury.categories[0].id.clone();
//! let commit = db.add_transaction(NewTransaction {
//!     amount: 120.0,
//!     date: codexdb::today(),
//!     kind: TransactionKind::Expense,
//!     category_id: food,
//!     note: "Groceries".to_string(),
//! })?;
//!
//! // The change is live even if the save failed
//! if let Some(notice) = commit.save.notice() {
//!     eprintln!("{notice}");
//! }
//!
//! db.close()?;
//! ```
//!
//! ## Key Concepts
//!
//! ### Document
//!
//! The [`Document`] is the whole application state: five sections, each a
//! set of record arrays. There is exactly one live document per handle, and
//! every mutation rewrites it in full under a single storage key.
//!
//! ### Schema merge
//!
//! Loading never fails. Missing keys are filled from the defaults, stored
//! arrays replace the default arrays whole, and values of the wrong JSON type
//! fall back to the default (see [`document::merge`]).
//!
//! ### Save outcomes
//!
//! Mutators return a [`Commit`]: the in-memory change always stands, and
//! [`Commit::save`] reports whether it also reached storage. A full store is
//! a [`SaveOutcome::QuotaExceeded`], never a lost edit.
//!
//! ## Thread Safety
//!
//! `CodexDB` is `Send + Sync`. Mutators take `&mut self`, so one handle has
//! one writer; wrap it in a `Mutex` to share it.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod db;
mod error;
mod types;
mod validation;

pub mod backup;
pub mod document;
pub mod events;
pub mod gateway;
pub mod storage;

// Domain modules
pub mod gym;
pub mod habits;
pub mod journal;
pub mod preferences;
pub mod study;
pub mod treasury;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main store interface
pub use db::{CodexDB, Commit};

// Configuration
pub use config::{Config, SyncMode};

// Error handling
pub use error::{CodexError, NotFoundError, Result, StorageError, ValidationError};

// Core types
pub use types::{format_date, parse_date, today, RecordId, Timestamp, DATE_FORMAT};

// Persistence
pub use backup::ExportBundle;
pub use document::{default_document, Document};
pub use events::StoreEvent;
pub use gateway::SaveOutcome;

// Domain types
pub use gym::{Exercise, NewExercise, NewSet, NewWorkout, WorkoutSession, WorkoutSet};
pub use habits::{Habit, HabitLog, HabitToggle};
pub use journal::{EntryDraft, JournalEntry};
pub use preferences::{Preferences, PreferencesUpdate};
pub use study::{
    Book, NewBook, NewStudySession, ReviewGrade, ReviewItem, StudySession, Subject,
    WeeklyProgress,
};
pub use treasury::{
    Budget, BudgetStatus, Category, CategorySpend, GoldEntry, GoldHoldings, GoldQuote,
    MonthSummary, NewGoldEntry, NewTransaction, Reconciliation, SavingsGoal, Transaction,
    TransactionKind,
};

// Storage (for advanced users)
pub use storage::StoreMetadata;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common codexdb usage.
///
/// ```rust
/// use codexdb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, SyncMode};
    pub use crate::db::{CodexDB, Commit};
    pub use crate::document::Document;
    pub use crate::error::{CodexError, Result};
    pub use crate::gateway::SaveOutcome;
    pub use crate::types::{today, RecordId, Timestamp};
}
