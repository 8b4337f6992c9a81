//! Named loggers.
//!
//! A [`Logger`] owns its identity (name, level, adornments) and shares its
//! redaction pipeline and sink with every child it creates. Each log call
//! runs synchronously: gate, normalize, redact, write.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde_json::{json, Map};
use tracing::debug;

use mulog_common::{Adornments, LogLevel};
use mulog_redact::RedactionPipeline;

use crate::error::{ConfigError, Result};
use crate::gate::{should_emit, Emit};
use crate::normalize::Argument;
use crate::sink::OutputSink;

/// Level used by [`Logger::stop`] when none is given.
pub const TIMER_LEVEL: LogLevel = LogLevel::Debug;

/// Build a `Vec<Argument>` from heterogeneous expressions.
///
/// ```
/// use mulog_core::{log_args, Argument};
/// use serde_json::json;
///
/// let args: Vec<Argument> = log_args!["save()", "saving user", json!({"id": 7})];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! log_args {
    () => {
        ::std::vec::Vec::<$crate::Argument>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Argument::from($arg)),+]
    };
}

/// Construction settings for a [`Logger`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggerConfig {
    /// Required, non-blank.
    pub name: Option<String>,
    /// Defaults to `info`.
    pub level: Option<LogLevel>,
    pub adornments: Adornments,
}

impl LoggerConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_adornment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.adornments.insert(key.into(), value.into());
        self
    }

    fn require_name(&self) -> std::result::Result<&str, ConfigError> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ConfigError::MissingName),
        }
    }
}

/// A named, levelled logger.
pub struct Logger {
    name: String,
    level: AtomicU8,
    adornments: Arc<Adornments>,
    pipeline: Arc<RedactionPipeline>,
    sink: Arc<dyn OutputSink>,
    timers: Mutex<HashMap<String, Instant>>,
}

impl Logger {
    /// Create a logger.
    ///
    /// Fails with [`ConfigError::MissingName`] when the name is missing or blank.
    pub fn new(
        config: LoggerConfig,
        pipeline: Arc<RedactionPipeline>,
        sink: Arc<dyn OutputSink>,
    ) -> std::result::Result<Self, ConfigError> {
        let name = config.require_name()?.to_string();
        Ok(Self::build(
            name,
            config.level.unwrap_or_default(),
            Arc::new(config.adornments),
            pipeline,
            sink,
        ))
    }

    pub(crate) fn build(
        name: String,
        level: LogLevel,
        adornments: Arc<Adornments>,
        pipeline: Arc<RedactionPipeline>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            name,
            level: AtomicU8::new(level.rank()),
            adornments,
            pipeline,
            sink,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_rank(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.rank(), Ordering::Relaxed);
    }

    pub fn adornments(&self) -> &Adornments {
        &self.adornments
    }

    pub fn pipeline(&self) -> &Arc<RedactionPipeline> {
        &self.pipeline
    }

    /// Whether a statement at `level` would be written.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        should_emit(self.level(), level)
    }

    pub fn is_trace(&self) -> bool {
        self.is_enabled(LogLevel::Trace)
    }

    pub fn is_debug(&self) -> bool {
        self.is_enabled(LogLevel::Debug)
    }

    pub fn is_info(&self) -> bool {
        self.is_enabled(LogLevel::Info)
    }

    pub fn is_warn(&self) -> bool {
        self.is_enabled(LogLevel::Warn)
    }

    pub fn is_error(&self) -> bool {
        self.is_enabled(LogLevel::Error)
    }

    /// Always true: fatal statements are never suppressed.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// A logger named `<parent>.<name>` sharing this logger's level,
    /// adornments, pipeline and sink.
    ///
    /// Fails with [`ConfigError::MissingName`] when `name` is blank.
    pub fn child(&self, name: &str) -> std::result::Result<Logger, ConfigError> {
        self.child_with(LoggerConfig::named(name))
    }

    /// Like [`Logger::child`], with the config's level and extra adornments
    /// taking precedence over the parent's.
    pub fn child_with(&self, config: LoggerConfig) -> std::result::Result<Logger, ConfigError> {
        let name = format!("{}.{}", self.name, config.require_name()?);
        let level = config.level.unwrap_or_else(|| self.level());
        let adornments = if config.adornments.is_empty() {
            Arc::clone(&self.adornments)
        } else {
            let mut merged = (*self.adornments).clone();
            merged.extend(config.adornments);
            Arc::new(merged)
        };
        Ok(Self::build(
            name,
            level,
            adornments,
            Arc::clone(&self.pipeline),
            Arc::clone(&self.sink),
        ))
    }

    pub fn trace<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Trace, args)
    }

    pub fn debug<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Debug, args)
    }

    pub fn info<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Info, args)
    }

    pub fn warn<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Warn, args)
    }

    pub fn error<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Error, args)
    }

    pub fn fatal<I: IntoIterator<Item = Argument>>(&self, args: I) -> Result<()> {
        self.log(LogLevel::Fatal, args)
    }

    /// Log at an explicit level.
    pub fn log<I: IntoIterator<Item = Argument>>(&self, level: LogLevel, args: I) -> Result<()> {
        self.log_with(level, || args)
    }

    /// Log at `level`, building the arguments only if the level is enabled.
    pub fn log_with<I, F>(&self, level: LogLevel, args: F) -> Result<()>
    where
        I: IntoIterator<Item = Argument>,
        F: FnOnce() -> I,
    {
        let emit = Emit {
            logger_level: self.level(),
            name: &self.name,
            adornments: &self.adornments,
            pipeline: &self.pipeline,
            sink: self.sink.as_ref(),
        };
        match emit.emit(level, args) {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!(logger = %self.name, level = %level, error = %e, "log call failed");
                Err(e)
            }
        }
    }

    /// Start a timer under `label`, replacing any running timer with the same label.
    pub fn start(&self, label: &str) {
        self.timers().insert(self.timer_key(label), Instant::now());
    }

    /// Stop the timer under `label` and log its duration.
    ///
    /// The statement carries `msg = label` and `data = {label, durationMs}`
    /// and is logged at `level`, or [`TIMER_LEVEL`]. Returns `Ok(false)`
    /// without logging when no such timer is running.
    pub fn stop(&self, label: &str, level: Option<LogLevel>) -> Result<bool> {
        let Some(started) = self.timers().remove(&self.timer_key(label)) else {
            return Ok(false);
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        self.log_with(level.unwrap_or(TIMER_LEVEL), || {
            let mut fields = Map::new();
            fields.insert("label".to_string(), json!(label));
            fields.insert("durationMs".to_string(), json!(elapsed_ms));
            vec![Argument::from(label), Argument::from(fields)]
        })?;
        Ok(true)
    }

    /// Whether a timer is running under `label`.
    pub fn is_timing(&self, label: &str) -> bool {
        self.timers().contains_key(&self.timer_key(label))
    }

    fn timer_key(&self, label: &str) -> String {
        format!("{}.{}", self.name, label)
    }

    fn timers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("adornments", &self.adornments)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use mulog_common::Stream;
    use mulog_redact::SENTINEL;

    fn logger(level: LogLevel) -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(
            LoggerConfig::named("app").with_level(level),
            Arc::new(RedactionPipeline::default()),
            sink.clone(),
        )
        .unwrap();
        (logger, sink)
    }

    #[test]
    fn test_name_required() {
        let sink: Arc<dyn OutputSink> = Arc::new(MemorySink::new());
        let pipeline = Arc::new(RedactionPipeline::default());
        for config in [LoggerConfig::default(), LoggerConfig::named("  ")] {
            let err = Logger::new(config, pipeline.clone(), sink.clone()).unwrap_err();
            assert!(matches!(err, ConfigError::MissingName));
        }
    }

    #[test]
    fn test_default_level_is_info() {
        let logger = Logger::new(
            LoggerConfig::named("app"),
            Arc::new(RedactionPipeline::empty()),
            Arc::new(MemorySink::new()),
        )
        .unwrap();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(logger.is_info());
        assert!(!logger.is_debug());
    }

    #[test]
    fn test_level_predicates() {
        let (logger, _) = logger(LogLevel::Error);
        assert!(!logger.is_trace());
        assert!(!logger.is_warn());
        assert!(logger.is_error());
        assert!(logger.is_fatal());

        logger.set_level(LogLevel::Trace);
        assert!(logger.is_trace());
        assert_eq!(logger.level(), LogLevel::Trace);
    }

    #[test]
    fn test_gated_statement_not_written() {
        let (logger, sink) = logger(LogLevel::Warn);
        logger.info(log_args!["quiet"]).unwrap();
        logger.debug(log_args!["quieter"]).unwrap();
        assert!(sink.is_empty());

        logger.warn(log_args!["loud"]).unwrap();
        assert_eq!(sink.on(Stream::Warn).len(), 1);
    }

    #[test]
    fn test_fatal_written_at_any_level() {
        let (logger, sink) = logger(LogLevel::Fatal);
        logger.error(log_args!["dropped"]).unwrap();
        logger.fatal(log_args!["kept"]).unwrap();
        let records = sink.on(Stream::Error);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["msg"], "kept");
    }

    #[test]
    fn test_statement_shape_and_redaction() {
        let (logger, sink) = logger(LogLevel::Info);
        logger
            .info(log_args![
                "charge()",
                "charging",
                json!({"password": "hunter2", "amount": 10})
            ])
            .unwrap();

        let record = sink.last().unwrap();
        assert_eq!(record["name"], "app");
        assert_eq!(record["level"], "info");
        assert_eq!(record["func"], "charge()");
        assert_eq!(record["msg"], "charging");
        assert_eq!(record["data"]["password"], SENTINEL);
        assert_eq!(record["data"]["amount"], 10);
        assert!(record.get("at").is_some());
    }

    #[test]
    fn test_child_inherits() {
        let sink = Arc::new(MemorySink::new());
        let parent = Logger::new(
            LoggerConfig::named("app")
                .with_level(LogLevel::Debug)
                .with_adornment("service", "billing"),
            Arc::new(RedactionPipeline::default()),
            sink.clone(),
        )
        .unwrap();

        let child = parent.child("db").unwrap();
        assert_eq!(child.name(), "app.db");
        assert_eq!(child.level(), LogLevel::Debug);
        assert_eq!(child.adornments()["service"], "billing");

        child.debug(log_args!["query"]).unwrap();
        let record = sink.last().unwrap();
        assert_eq!(record["name"], "app.db");
        assert_eq!(record["service"], "billing");
    }

    #[test]
    fn test_child_level_independent_after_creation() {
        let (parent, _) = logger(LogLevel::Info);
        let child = parent.child("worker").unwrap();
        parent.set_level(LogLevel::Error);
        assert_eq!(child.level(), LogLevel::Info);
    }

    #[test]
    fn test_child_blank_name_rejected() {
        let (parent, _) = logger(LogLevel::Info);
        for name in ["", "   "] {
            let err = parent.child(name).unwrap_err();
            assert!(matches!(err, ConfigError::MissingName));
        }
    }

    #[test]
    fn test_child_with_overrides() {
        let (parent, _) = logger(LogLevel::Info);
        let child = parent
            .child_with(
                LoggerConfig::named("cache")
                    .with_level(LogLevel::Trace)
                    .with_adornment("region", "eu"),
            )
            .unwrap();
        assert_eq!(child.name(), "app.cache");
        assert_eq!(child.level(), LogLevel::Trace);
        assert_eq!(child.adornments()["region"], "eu");

        let err = parent.child_with(LoggerConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingName));
    }

    #[test]
    fn test_timer_logs_duration() {
        let (logger, sink) = logger(LogLevel::Debug);
        logger.start("load");
        assert!(logger.is_timing("load"));

        assert!(logger.stop("load", None).unwrap());
        assert!(!logger.is_timing("load"));

        let record = sink.last().unwrap();
        assert_eq!(record["level"], "debug");
        assert_eq!(record["msg"], "load");
        assert_eq!(record["data"]["label"], "load");
        assert!(record["data"]["durationMs"].is_u64());
    }

    #[test]
    fn test_timer_unknown_label() {
        let (logger, sink) = logger(LogLevel::Trace);
        assert!(!logger.stop("never-started", None).unwrap());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_timer_explicit_level_gated() {
        let (logger, sink) = logger(LogLevel::Info);
        logger.start("quiet");
        assert!(logger.stop("quiet", None).unwrap());
        assert!(sink.is_empty());

        logger.start("loud");
        assert!(logger.stop("loud", Some(LogLevel::Warn)).unwrap());
        assert_eq!(sink.on(Stream::Warn).len(), 1);
    }

    #[test]
    fn test_empty_log_args() {
        let (logger, sink) = logger(LogLevel::Info);
        logger.info(log_args![]).unwrap();
        let record = sink.last().unwrap();
        assert!(record.get("msg").is_none());
        assert!(record.get("data").is_none());
    }
}
