//! mulog core: loggers, statement normalization and output.
//!
//! A log call flows through four steps:
//!
//! 1. **Gate**: statements below the logger's level are dropped before any
//!    work is done (fatal always passes).
//! 2. **Normalize**: the call's [`Argument`]s are folded into one
//!    [`LogStatement`].
//! 3. **Redact**: the logger's [`RedactionPipeline`] scrubs message and data.
//! 4. **Route**: the statement goes to the [`OutputSink`] method for its
//!    level's stream.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mulog_core::{log_args, Logger, LoggerConfig, MemorySink, RedactionPipeline};
//! use serde_json::json;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = Logger::new(
//!     LoggerConfig::named("payments"),
//!     Arc::new(RedactionPipeline::default()),
//!     sink.clone(),
//! )
//! .unwrap();
//!
//! logger
//!     .info(log_args!["charge()", "charging card", json!({"card": "4111 1111 1111 1111"})])
//!     .unwrap();
//!
//! let record = sink.last().unwrap();
//! assert_eq!(record["data"]["card"], ">>> REDACTED <<<");
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod gate;
pub mod logger;
pub mod logging;
pub mod normalize;
pub mod registry;
pub mod sink;

pub use config::{LevelConfig, LEVEL_ENV};
pub use error::{ConfigError, LogError};
pub use gate::{route, should_emit};
pub use logger::{Logger, LoggerConfig, TIMER_LEVEL};
pub use normalize::{normalize, normalize_at, Argument};
pub use registry::{LoggerRegistry, DEFAULT_LOGGER_NAME};
pub use sink::{ConsoleSink, MemorySink, OutputFormat, OutputSink, WriterSink};

pub use mulog_common::{Adornments, Data, ErrorInfo, LogLevel, LogStatement, Stream};
pub use mulog_redact::{RedactionPipeline, RedactionPolicy, SENTINEL};
