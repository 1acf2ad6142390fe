//! Error types for codexdb.
//!
//! codexdb uses a hierarchical error system:
//! - `CodexError` is the top-level error returned by all public APIs
//! - Specific error types (`StorageError`, `ValidationError`, `NotFoundError`)
//!   provide detail
//!
//! Save failures are deliberately *not* errors: a mutator that validated and
//! applied its change returns `Ok`, and the outcome of the write is carried in
//! [`SaveOutcome`](crate::SaveOutcome).
//!
//! # Error Handling Pattern
//! ```rust,ignore
//! use codexdb::{CodexDB, Config, Result};
//!
//! fn example() -> Result<()> {
//!     let mut db = CodexDB::open("./codex.db", Config::default())?;
//!     // ... operations that may fail ...
//!     db.close()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias for codexdb operations.
pub type Result<T> = std::result::Result<T, CodexError>;

/// Top-level error enum for all codexdb operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum CodexError {
    /// Storage layer error (I/O, corruption, transactions, quota).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested record not found.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),
}

impl CodexError {
    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the storage quota was exceeded.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Storage(StorageError::QuotaExceeded { .. }))
    }
}

/// Storage-related errors.
///
/// These errors indicate problems with the underlying key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Stored data is corrupted.
    #[error("Store corrupted: {0}")]
    Corrupted(String),

    /// Store is locked by another process.
    #[error("Store is locked by another writer")]
    StoreLocked,

    /// Transaction failed (commit, rollback, etc.).
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the redb storage engine.
    #[error("Storage engine error: {0}")]
    Redb(String),

    /// Writing would push the store past its byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed (quota: {quota} bytes)")]
    QuotaExceeded {
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The store refused the write for a reason other than quota.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Store format version doesn't match expected version.
    #[error("Format version mismatch: expected {expected}, found {found}")]
    FormatVersionMismatch {
        /// Expected format version.
        expected: u32,
        /// Actual format version found in the store.
        found: u32,
    },
}

impl StorageError {
    /// Creates a corruption error with the given message.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Creates a transaction error with the given message.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a redb error with the given message.
    pub fn redb(msg: impl Into<String>) -> Self {
        Self::Redb(msg.into())
    }

    /// Creates an unavailable-store error with the given message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

// Conversions from redb error types
impl From<redb::Error> for StorageError {
    fn from(err: redb::Error) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(err: redb::DatabaseError) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::Transaction(err.to_string())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::Transaction(format!("Commit failed: {}", err))
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::Redb(format!("Table error: {}", err))
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::Redb(format!("Storage error: {}", err))
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// Also allow direct conversion to CodexError for convenience
impl From<redb::Error> for CodexError {
    fn from(err: redb::Error) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<redb::DatabaseError> for CodexError {
    fn from(err: redb::DatabaseError) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<redb::TransactionError> for CodexError {
    fn from(err: redb::TransactionError) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<redb::CommitError> for CodexError {
    fn from(err: redb::CommitError) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<redb::TableError> for CodexError {
    fn from(err: redb::TableError) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<redb::StorageError> for CodexError {
    fn from(err: redb::StorageError) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<bincode::Error> for CodexError {
    fn from(err: bincode::Error) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for CodexError {
    fn from(err: serde_json::Error) -> Self {
        CodexError::Storage(StorageError::from(err))
    }
}

/// Validation errors for input data.
///
/// These errors indicate problems with data provided by the caller. A
/// mutator that returns one of these has not touched the document or storage.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// Text exceeds maximum allowed size.
    #[error("Content too large: {size} bytes (max: {max} bytes)")]
    ContentTooLarge {
        /// Actual content size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// Too many items in a collection field.
    #[error("Too many items in '{field}': {count} (max: {max})")]
    TooManyItems {
        /// Name of the field.
        field: String,
        /// Actual count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The record is still referenced by other records and cannot be removed.
    #[error("{entity} '{id}' is in use by {references} record(s)")]
    InUse {
        /// Kind of record that was to be removed.
        entity: String,
        /// Identifier of that record.
        id: String,
        /// Number of records still referencing it.
        references: usize,
    },

    /// The operation conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ValidationError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates a content too large error.
    pub fn content_too_large(size: usize, max: usize) -> Self {
        Self::ContentTooLarge { size, max }
    }

    /// Creates a too many items error.
    pub fn too_many_items(field: impl Into<String>, count: usize, max: usize) -> Self {
        Self::TooManyItems {
            field: field.into(),
            count,
            max,
        }
    }

    /// Creates an in-use error.
    pub fn in_use(entity: impl Into<String>, id: impl ToString, references: usize) -> Self {
        Self::InUse {
            entity: entity.into(),
            id: id.to_string(),
            references,
        }
    }

    /// Creates a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// Not found errors for specific record kinds.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// Transaction with given ID not found.
    #[error("Transaction not found: {0}")]
    Transaction(String),

    /// Category with given ID not found.
    #[error("Category not found: {0}")]
    Category(String),

    /// Gold holding with given ID not found.
    #[error("Gold entry not found: {0}")]
    GoldEntry(String),

    /// Budget envelope with given ID not found.
    #[error("Budget not found: {0}")]
    Budget(String),

    /// Savings goal with given ID not found.
    #[error("Goal not found: {0}")]
    Goal(String),

    /// Habit with given ID not found.
    #[error("Habit not found: {0}")]
    Habit(String),

    /// Workout session with given ID not found.
    #[error("Workout not found: {0}")]
    Workout(String),

    /// Exercise with given ID not found.
    #[error("Exercise not found: {0}")]
    Exercise(String),

    /// Study subject with given ID not found.
    #[error("Subject not found: {0}")]
    Subject(String),

    /// Study session with given ID not found.
    #[error("Study session not found: {0}")]
    StudySession(String),

    /// Book with given ID not found.
    #[error("Book not found: {0}")]
    Book(String),

    /// Spaced-review item with given ID not found.
    #[error("Review item not found: {0}")]
    ReviewItem(String),

    /// Journal entry with given ID not found.
    #[error("Journal entry not found: {0}")]
    JournalEntry(String),
}

impl NotFoundError {
    /// Creates a transaction not found error.
    pub fn transaction(id: impl ToString) -> Self {
        Self::Transaction(id.to_string())
    }

    /// Creates a category not found error.
    pub fn category(id: impl ToString) -> Self {
        Self::Category(id.to_string())
    }

    /// Creates a gold entry not found error.
    pub fn gold_entry(id: impl ToString) -> Self {
        Self::GoldEntry(id.to_string())
    }

    /// Creates a budget not found error.
    pub fn budget(id: impl ToString) -> Self {
        Self::Budget(id.to_string())
    }

    /// Creates a goal not found error.
    pub fn goal(id: impl ToString) -> Self {
        Self::Goal(id.to_string())
    }

    /// Creates a habit not found error.
    pub fn habit(id: impl ToString) -> Self {
        Self::Habit(id.to_string())
    }

    /// Creates a workout not found error.
    pub fn workout(id: impl ToString) -> Self {
        Self::Workout(id.to_string())
    }

    /// Creates an exercise not found error.
    pub fn exercise(id: impl ToString) -> Self {
        Self::Exercise(id.to_string())
    }

    /// Creates a subject not found error.
    pub fn subject(id: impl ToString) -> Self {
        Self::Subject(id.to_string())
    }

    /// Creates a study session not found error.
    pub fn study_session(id: impl ToString) -> Self {
        Self::StudySession(id.to_string())
    }

    /// Creates a book not found error.
    pub fn book(id: impl ToString) -> Self {
        Self::Book(id.to_string())
    }

    /// Creates a review item not found error.
    pub fn review_item(id: impl ToString) -> Self {
        Self::ReviewItem(id.to_string())
    }

    /// Creates a journal entry not found error.
    pub fn journal_entry(id: impl ToString) -> Self {
        Self::JournalEntry(id.to_string())
    }
}
