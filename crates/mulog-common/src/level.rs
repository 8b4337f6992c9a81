//! Severity levels and output streams.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::LevelParseError;

/// Severity of a log statement.
///
/// The ordering is total: `Trace < Debug < Info < Warn < Error < Fatal`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug information.
    Debug,
    /// Standard operational info (default).
    #[default]
    Info,
    /// Something unexpected that did not fail the operation.
    Warn,
    /// An operation failed.
    Error,
    /// Terminal severity, never suppressed.
    Fatal,
}

impl LogLevel {
    /// Every level, lowest first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Numeric rank, `trace = 0` through `fatal = 5`.
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warn => 3,
            LogLevel::Error => 4,
            LogLevel::Fatal => 5,
        }
    }

    /// Inverse of [`LogLevel::rank`].
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// The stream a statement of this level is written to.
    pub fn stream(self) -> Stream {
        Stream::for_level(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(LevelParseError::new(s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output stream selected by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// trace, debug and info.
    Stdout,
    /// warn.
    Warn,
    /// error and fatal.
    Error,
}

impl Stream {
    pub fn for_level(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace | LogLevel::Debug | LogLevel::Info => Stream::Stdout,
            LogLevel::Warn => Stream::Warn,
            LogLevel::Error | LogLevel::Fatal => Stream::Error,
        }
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Warn => write!(f, "warn"),
            Stream::Error => write!(f, "error"),
        }
    }
}
