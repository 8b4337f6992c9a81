//! Diagnostics logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (MULOG_LOG, MULOG_LOG_FORMAT, RUST_LOG)
//! - CLI flags (--log-level, --log-format)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Environment variable selecting the diagnostics level.
pub const LOG_ENV: &str = "MULOG_LOG";

/// Environment variable selecting the diagnostics format.
pub const LOG_FORMAT_ENV: &str = "MULOG_LOG_FORMAT";

/// Diagnostics output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Diagnostics verbosity.
///
/// Distinct from [`mulog_common::LogLevel`]: this filters mulog's own
/// internal events, not the statements it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Trace,
    Debug,
    Info,
    /// Warnings and errors only (default).
    #[default]
    Warn,
    Error,
    /// Completely silent.
    Off,
}

impl std::str::FromStr for DiagnosticLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(DiagnosticLevel::Trace),
            "debug" => Ok(DiagnosticLevel::Debug),
            "info" => Ok(DiagnosticLevel::Info),
            "warn" | "warning" => Ok(DiagnosticLevel::Warn),
            "error" => Ok(DiagnosticLevel::Error),
            "off" | "none" | "quiet" => Ok(DiagnosticLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Trace => write!(f, "trace"),
            DiagnosticLevel::Debug => write!(f, "debug"),
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warn => write!(f, "warn"),
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Off => write!(f, "off"),
        }
    }
}

impl From<DiagnosticLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: DiagnosticLevel) -> Self {
        use tracing_subscriber::filter::LevelFilter;
        match level {
            DiagnosticLevel::Trace => LevelFilter::TRACE,
            DiagnosticLevel::Debug => LevelFilter::DEBUG,
            DiagnosticLevel::Info => LevelFilter::INFO,
            DiagnosticLevel::Warn => LevelFilter::WARN,
            DiagnosticLevel::Error => LevelFilter::ERROR,
            DiagnosticLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Diagnostics logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: DiagnosticLevel,
    /// Whether to include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: DiagnosticLevel::Warn,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment and CLI overrides.
    ///
    /// `MULOG_LOG` takes precedence over `RUST_LOG`; CLI values win over both.
    pub fn from_env(cli_level: Option<DiagnosticLevel>, cli_format: Option<LogFormat>) -> Self {
        let mut config = LogConfig::default();

        if let Ok(val) = std::env::var(LOG_ENV) {
            if let Ok(level) = val.parse::<DiagnosticLevel>() {
                config.level = level;
            }
        } else if let Ok(val) = std::env::var("RUST_LOG") {
            // Only a bare level is honoured; per-target directives are ignored.
            if let Ok(level) = val.parse::<DiagnosticLevel>() {
                config.level = level;
            }
        }

        if let Ok(val) = std::env::var(LOG_FORMAT_ENV) {
            if let Ok(format) = val.parse::<LogFormat>() {
                config.format = format;
            }
        }

        if let Some(level) = cli_level {
            config.level = level;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: DiagnosticLevel) -> Self {
        self.level = level;
        self
    }

    /// Enable timestamps in human output.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// `EnvFilter` directives covering the mulog crates.
    pub fn directives(&self) -> String {
        format!(
            "mulog_core={level},mulog_redact={level},mulog={level}",
            level = self.level
        )
    }
}
