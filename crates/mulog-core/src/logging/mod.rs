//! Diagnostics for mulog itself.
//!
//! mulog reports its own internal events (logger creation, failed log
//! calls, JSON bodies that did not parse) through `tracing`. This module
//! wires a `tracing-subscriber` for binaries that want to see them:
//! - Human-readable console output for interactive use
//! - JSONL for machine consumption
//!
//! Diagnostics always go to stderr. stdout belongs to the statements
//! written by [`crate::sink::ConsoleSink`].
//!
//! # Usage
//!
//! ```no_run
//! use mulog_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config).ok();
//! ```

pub mod config;

pub use config::{DiagnosticLevel, LogConfig, LogFormat, LOG_ENV, LOG_FORMAT_ENV};

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter for `config`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .parse_lossy(config.directives())
}

/// Initialize the diagnostics subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = env_filter(config);

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .flatten_event(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    }
}

/// Initialize from the environment alone (for tests and simple cases).
pub fn init_default_logging() -> Result<(), TryInitError> {
    init_logging(&LogConfig::from_env(None, None))
}
