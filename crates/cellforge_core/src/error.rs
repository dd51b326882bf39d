//! Error types for the substitution and placement core.
//!
//! Soft placement outcomes (invalid request, blocked target, admission cap)
//! are not errors; they are reported through
//! [`PlacementOutcome`](crate::placement::PlacementOutcome). Only failures the
//! core cannot account for locally end up here.

use thiserror::Error;

/// Result type alias using [`CellforgeError`].
pub type Result<T> = std::result::Result<T, CellforgeError>;

/// Failure reported by a host callback.
///
/// The core never inspects or retries these; they are handed back to the
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct HostError {
    /// Host operation that failed (e.g. `use_resource_on_cell`).
    pub operation: &'static str,
    /// Host-provided description.
    pub message: String,
}

impl HostError {
    /// Create a new host error.
    #[must_use]
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Top-level error type for the core.
#[derive(Debug, Error)]
pub enum CellforgeError {
    /// A host callback rejected or failed the operation.
    #[error("Host operation failed: {0}")]
    Host(#[from] HostError),

    /// Substitution policy violates its band ordering rules.
    #[error("Invalid substitution policy: {0}")]
    InvalidPolicy(String),

    /// Configuration values out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration or policy text failed to parse.
    #[error("Failed to parse '{path}': {message}")]
    ConfigParse {
        /// Source the text came from.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Reading a file failed.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Error message.
        message: String,
    },
}
