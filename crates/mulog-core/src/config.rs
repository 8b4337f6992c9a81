//! Level configuration.
//!
//! Levels are configured with a single string, usually from `LOG_LEVEL`:
//!
//! ```text
//! <default>;<name> <level>;<name> <level>...
//! ```
//!
//! The first segment is the default level (empty means `info`). Each further
//! segment overrides the level of one named logger; names are matched
//! case-insensitively.

use std::collections::HashMap;

use mulog_common::LogLevel;

use crate::error::ConfigError;

/// Environment variable holding the level configuration.
pub const LEVEL_ENV: &str = "LOG_LEVEL";

/// Parsed level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelConfig {
    default: LogLevel,
    overrides: HashMap<String, LogLevel>,
}

impl LevelConfig {
    /// Configuration with the given default and no overrides.
    pub fn new(default: LogLevel) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Parse a configuration string.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut segments = input.split(';');

        let default = match segments.next().map(str::trim) {
            None | Some("") => LogLevel::default(),
            Some(level) => level.parse()?,
        };

        let mut overrides = HashMap::new();
        for segment in segments.map(str::trim).filter(|s| !s.is_empty()) {
            let mut parts = segment.split_whitespace();
            let (Some(name), Some(level), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ConfigError::InvalidOverride {
                    segment: segment.to_string(),
                });
            };
            overrides.insert(name.to_lowercase(), level.parse()?);
        }

        Ok(Self { default, overrides })
    }

    /// Read `LOG_LEVEL`. An unset or empty variable gives the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(LEVEL_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn default_level(&self) -> LogLevel {
        self.default
    }

    pub fn set_default_level(&mut self, level: LogLevel) {
        self.default = level;
    }

    /// Add or replace the override for `name`.
    pub fn with_override(mut self, name: &str, level: LogLevel) -> Self {
        self.overrides.insert(name.to_lowercase(), level);
        self
    }

    /// The override for `name`, if any.
    pub fn override_for(&self, name: &str) -> Option<LogLevel> {
        self.overrides.get(&name.to_lowercase()).copied()
    }

    /// The override for `name`, else the default.
    pub fn level_for(&self, name: &str) -> LogLevel {
        self.override_for(name).unwrap_or(self.default)
    }
}
