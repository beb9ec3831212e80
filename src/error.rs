//! Error types shared across the scheduling core and persistence layer.
//!
//! The core validates before it mutates: every error here is raised with the
//! task collection untouched, except `MalformedTree` which signals that the
//! collection was already corrupt on entry.

use thiserror::Error;

/// Errors raised by the task store and its collaborators.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation referenced a task id absent from the collection.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The operation was rejected before any state change was applied:
    /// a reparent that would create a cycle, a date/duration edit on a
    /// container task, or an edit producing a non-positive span.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Rollup failed to reach a fixed point within its pass bound. This
    /// cannot happen through the sanctioned API and indicates the loaded
    /// data contains a parent cycle that slipped past validation.
    #[error("malformed task tree: rollup did not stabilise")]
    MalformedTree,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, Error>;
