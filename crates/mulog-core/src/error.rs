//! Error types for logger construction and log calls.

use mulog_common::LevelParseError;
use mulog_redact::RedactionError;
use thiserror::Error;

/// Errors raised while building loggers or reading configuration.
///
/// These fail fast: nothing is logged with a half-built logger.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("logger name is required")]
    MissingName,

    #[error("invalid log level: {0}")]
    InvalidLevel(#[from] LevelParseError),

    #[error("invalid level override '{segment}': expected '<name> <level>'")]
    InvalidOverride { segment: String },

    #[error("redaction policy error: {0}")]
    Redaction(#[from] RedactionError),
}

/// Errors raised by a single log call.
#[derive(Error, Debug)]
pub enum LogError {
    /// A redaction filter failed; the statement was not written.
    #[error("redaction failed: {0}")]
    Redaction(#[from] RedactionError),

    /// The sink could not write the statement.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogError>;
