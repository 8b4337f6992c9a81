//! Redaction policy configuration.
//!
//! Defines which filters a pipeline is built from, which fields carry
//! embedded JSON documents, and any extra names or patterns to redact.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::card::DEFAULT_MIN_LENGTH;
use crate::error::RedactionError;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// Field names whose string values are parsed as JSON before filtering.
pub const DEFAULT_JSON_FIELDS: &[&str] = &[
    "body",
    "rawBody",
    "requestBody",
    "responseBody",
    "payload",
];

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Whether card/account number detection runs on values.
    #[serde(default = "default_true")]
    pub detection_enabled: bool,

    /// Shortest string the card detector scans.
    #[serde(default = "default_min_digit_length")]
    pub min_digit_length: usize,

    /// Fields holding JSON documents encoded as strings.
    #[serde(default = "default_json_fields")]
    pub json_fields: Vec<String>,

    /// Field names redacted in addition to the built-in set.
    #[serde(default)]
    pub extra_sensitive_names: Vec<String>,

    /// Custom detection patterns.
    #[serde(default)]
    pub detection_patterns: Vec<DetectionPattern>,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_digit_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_json_fields() -> Vec<String> {
    DEFAULT_JSON_FIELDS.iter().map(|s| s.to_string()).collect()
}

/// Custom detection pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionPattern {
    /// Name of the pattern, reported when it fails to compile.
    pub name: String,

    /// Regex pattern; every match is replaced with the sentinel.
    pub pattern: String,

    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load policy from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: RedactionPolicy = serde_json::from_str(&content)?;
        Ok(policy)
    }

    /// Save policy to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the policy for values no pipeline can be built from.
    ///
    /// Pattern syntax is checked when the pipeline compiles the patterns.
    pub fn validate(&self) -> crate::Result<()> {
        let major = self.schema_version.split('.').next().unwrap_or_default();
        let expected = POLICY_SCHEMA_VERSION.split('.').next().unwrap_or_default();
        if major != expected {
            return Err(RedactionError::PolicyError(format!(
                "unsupported schema_version {} (expected {}.x)",
                self.schema_version, expected
            )));
        }
        if self.min_digit_length == 0 {
            return Err(RedactionError::PolicyError(
                "min_digit_length must be at least 1".to_string(),
            ));
        }
        for (i, pattern) in self.detection_patterns.iter().enumerate() {
            if pattern.name.trim().is_empty() {
                return Err(RedactionError::PolicyError(format!(
                    "detection_patterns[{}].name is empty",
                    i
                )));
            }
            if pattern.pattern.is_empty() {
                return Err(RedactionError::PolicyError(format!(
                    "detection_patterns[{}] ({}) has an empty pattern",
                    i, pattern.name
                )));
            }
        }
        Ok(())
    }

    /// Add a custom pattern.
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.detection_patterns.push(DetectionPattern {
            name: name.into(),
            pattern: pattern.into(),
            description: None,
        });
        self
    }

    /// Add extra sensitive field names.
    pub fn with_sensitive_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_sensitive_names
            .extend(names.into_iter().map(Into::into));
        self
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            detection_enabled: true,
            min_digit_length: DEFAULT_MIN_LENGTH,
            json_fields: default_json_fields(),
            extra_sensitive_names: Vec::new(),
            detection_patterns: Vec::new(),
        }
    }
}
