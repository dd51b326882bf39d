//! Error types for the tools.

use cellforge_core::error::CellforgeError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Error from the core crate (loading, validation, host failures).
    #[error(transparent)]
    Core(#[from] CellforgeError),

    /// Report serialization failed.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    /// Path is neither a RON file nor a directory.
    #[error("Not a RON file or directory: {0}")]
    UnsupportedPath(String),
}
