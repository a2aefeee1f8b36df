//! Error types for the weekly planner.

use crate::task::Task;

/// Top-level error type for the planner core.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// SQLite query or write failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Storage file could not be opened or created.
    #[error("storage unavailable at {path}: {reason}")]
    Storage {
        /// Resolved database path.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A week key string was not of the form `YYYY-Www`.
    #[error("invalid week key: {0}")]
    InvalidWeekKey(String),

    /// Task failed validation before reaching storage.
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// A sequential day save stopped partway through.
    #[error("saved {} of {} tasks before failure: {source}", .saved.len(), .saved.len() + .unsaved.len())]
    PartialSave {
        /// Tasks persisted before the failure, with reconciled identifiers.
        saved: Vec<Task>,
        /// The failing task and every task after it, untouched.
        unsaved: Vec<Task>,
        /// Failure that stopped the loop.
        #[source]
        source: Box<PlannerError>,
    },

    /// A host command carried a missing or malformed field.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// JSON encoding or decoding failure on the host channel.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Connection mutex was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Lock(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PlannerError>;
