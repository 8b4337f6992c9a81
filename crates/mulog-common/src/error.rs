//! Error types shared across mulog crates.

use thiserror::Error;

/// A severity name that is not one of the six known levels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {input:?} (expected trace, debug, info, warn, error or fatal)")]
pub struct LevelParseError {
    /// The text that failed to parse.
    pub input: String,
}

impl LevelParseError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}
