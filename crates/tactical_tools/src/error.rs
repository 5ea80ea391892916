//! Tool errors.

use tactical_core::error::CombatError;
use thiserror::Error;

/// Errors raised by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Failed to read or write a file.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// Path involved.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A data file failed validation.
    #[error("Validation failed for '{path}': {errors:?}")]
    Validation {
        /// File that failed.
        path: String,
        /// Problems found.
        errors: Vec<String>,
    },

    /// The combat core refused something.
    #[error(transparent)]
    Combat(#[from] CombatError),

    /// Report encoding failed.
    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
