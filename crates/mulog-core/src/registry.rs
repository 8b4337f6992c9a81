//! Logger registry.
//!
//! Hands out one shared [`Logger`] per component name. Component names are
//! cached case-insensitively; the level of a new logger comes from the
//! [`LevelConfig`] override for its name, else the configured default.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use mulog_common::{Adornments, LogLevel};
use mulog_redact::RedactionPipeline;

use crate::config::LevelConfig;
use crate::error::ConfigError;
use crate::logger::{Logger, LoggerConfig};
use crate::sink::OutputSink;

/// Name of the registry's root logger.
pub const DEFAULT_LOGGER_NAME: &str = "default";

pub struct LoggerRegistry {
    levels: Mutex<LevelConfig>,
    pipeline: Arc<RedactionPipeline>,
    sink: Arc<dyn OutputSink>,
    adornments: Arc<Adornments>,
    root: Arc<Logger>,
    cache: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new(
        levels: LevelConfig,
        pipeline: Arc<RedactionPipeline>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        let adornments = Arc::new(Adornments::new());
        let root = Arc::new(Logger::build(
            DEFAULT_LOGGER_NAME.to_string(),
            levels.default_level(),
            Arc::clone(&adornments),
            Arc::clone(&pipeline),
            Arc::clone(&sink),
        ));
        Self {
            levels: Mutex::new(levels),
            pipeline,
            sink,
            adornments,
            root,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Stamp `adornments` on every logger this registry creates.
    pub fn with_adornments(mut self, adornments: Adornments) -> Self {
        self.adornments = Arc::new(adornments);
        self.root = Arc::new(Logger::build(
            DEFAULT_LOGGER_NAME.to_string(),
            self.root.level(),
            Arc::clone(&self.adornments),
            Arc::clone(&self.pipeline),
            Arc::clone(&self.sink),
        ));
        self.lock_cache().clear();
        self
    }

    /// The root logger.
    pub fn default_logger(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    pub fn default_level(&self) -> LogLevel {
        self.lock_levels().default_level()
    }

    /// Change the default level.
    ///
    /// Applies to the root logger and to loggers created from now on.
    /// Loggers already handed out keep their level.
    pub fn set_default_level(&self, level: LogLevel) {
        self.lock_levels().set_default_level(level);
        self.root.set_level(level);
    }

    /// The logger for `component`, created on first use.
    pub fn named(&self, component: &str) -> Result<Arc<Logger>, ConfigError> {
        self.named_with(LoggerConfig::named(component))
    }

    /// The logger for `config.name`, created on first use.
    ///
    /// On creation an explicit `config.level` wins over the configured
    /// levels, and `config.adornments` are added to the registry's. A cached
    /// logger is returned as is.
    pub fn named_with(&self, config: LoggerConfig) -> Result<Arc<Logger>, ConfigError> {
        let component = match config.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ConfigError::MissingName),
        };
        let key = component.to_lowercase();

        let mut cache = self.lock_cache();
        if let Some(logger) = cache.get(&key) {
            return Ok(Arc::clone(logger));
        }

        let level = match config.level {
            Some(level) => level,
            None => self.lock_levels().level_for(&component),
        };
        let adornments = if config.adornments.is_empty() {
            Arc::clone(&self.adornments)
        } else {
            let mut merged = (*self.adornments).clone();
            merged.extend(config.adornments);
            Arc::new(merged)
        };

        debug!(logger = %component, level = %level, "created logger");
        let logger = Arc::new(Logger::build(
            component,
            level,
            adornments,
            Arc::clone(&self.pipeline),
            Arc::clone(&self.sink),
        ));
        cache.insert(key, Arc::clone(&logger));
        Ok(logger)
    }

    /// Number of cached component loggers.
    pub fn len(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_cache().is_empty()
    }

    /// Forget every cached logger. Loggers already handed out keep working.
    pub fn clear(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, Arc<Logger>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_levels(&self) -> MutexGuard<'_, LevelConfig> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.len();
        let levels = self.lock_levels().clone();
        f.debug_struct("LoggerRegistry")
            .field("levels", &levels)
            .field("adornments", &self.adornments)
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}
