//! Error types for the redaction engine.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur during redaction.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// A filter refused its input. Propagated to the log call unchanged.
    #[error("filter {filter} failed: {message}")]
    Filter { filter: String, message: String },

    /// Failed to compile a regex pattern.
    #[error("pattern error: {0}")]
    PatternError(String),

    /// The policy holds values no pipeline can be built from.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RedactionError {
    /// Build a filter failure.
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        RedactionError::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }
}
