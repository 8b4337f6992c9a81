//! User-supplied regex filters.

use regex::Regex;
use serde_json::Value;

use crate::filter::{RedactionFilter, ToRedact, SENTINEL};
use crate::{RedactionError, Result};

/// Replaces every match of a custom pattern in string values.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    name: String,
    pattern: Regex,
}

impl PatternFilter {
    /// Compile a pattern filter. Invalid patterns fail here, never at log time.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern)
            .map_err(|e| RedactionError::PatternError(format!("{}: {}", name, e)))?;
        Ok(Self { name, pattern })
    }
}

impl RedactionFilter for PatternFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn redact(&self, input: ToRedact<'_>) -> Result<Option<Value>> {
        let Value::String(text) = input.value else {
            return Ok(None);
        };
        if text == SENTINEL || !self.pattern.is_match(text) {
            return Ok(None);
        }
        let replaced = self.pattern.replace_all(text, regex::NoExpand(SENTINEL));
        Ok(Some(Value::String(replaced.into_owned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_replaces_matches() {
        let filter = PatternFilter::new("ssn", r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
        let value = json!("ssn is 123-45-6789.");
        let result = filter.redact(ToRedact::value(&value)).unwrap();
        assert_eq!(result, Some(json!(format!("ssn is {}.", SENTINEL))));
    }

    #[test]
    fn test_pattern_no_match() {
        let filter = PatternFilter::new("ssn", r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
        let value = json!("nothing here");
        assert!(filter.redact(ToRedact::value(&value)).unwrap().is_none());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = PatternFilter::new("broken", "([a-z").unwrap_err();
        assert!(matches!(err, RedactionError::PatternError(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_non_strings_ignored() {
        let filter = PatternFilter::new("digits", r"\d+").unwrap();
        let value = json!(12345);
        assert!(filter.redact(ToRedact::value(&value)).unwrap().is_none());
    }
}
