//! Ordered filter chain.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::card::CardNumberFilter;
use crate::field_name::SensitiveNameFilter;
use crate::filter::{is_redacted, RedactionFilter, ToRedact};
use crate::pattern::PatternFilter;
use crate::policy::{RedactionPolicy, DEFAULT_JSON_FIELDS};
use crate::Result;

/// An ordered chain of redaction filters.
///
/// Each filter sees the output of the one before it, and the chain stops as
/// soon as the value has become the sentinel. An empty pipeline leaves every
/// value untouched.
#[derive(Clone)]
pub struct RedactionPipeline {
    filters: Vec<Arc<dyn RedactionFilter>>,
    /// Lower-cased names of fields holding JSON-encoded documents.
    json_fields: HashSet<String>,
}

impl RedactionPipeline {
    /// Pipeline with the given filters and the default JSON body fields.
    pub fn new(filters: Vec<Arc<dyn RedactionFilter>>) -> Self {
        Self {
            filters,
            json_fields: DEFAULT_JSON_FIELDS
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Pipeline without filters.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build the pipeline described by a policy.
    ///
    /// Fails if the policy is invalid or a custom pattern does not compile.
    pub fn from_policy(policy: &RedactionPolicy) -> Result<Self> {
        policy.validate()?;
        let mut filters: Vec<Arc<dyn RedactionFilter>> = Vec::new();
        if policy.detection_enabled {
            filters.push(Arc::new(CardNumberFilter::with_min_length(
                policy.min_digit_length,
            )));
        }
        filters.push(Arc::new(SensitiveNameFilter::with_extra_names(
            &policy.extra_sensitive_names,
        )));
        for pattern in &policy.detection_patterns {
            filters.push(Arc::new(PatternFilter::new(&pattern.name, &pattern.pattern)?));
        }

        Ok(Self::new(filters).with_json_fields(&policy.json_fields))
    }

    /// Append a filter to the end of the chain.
    pub fn with_filter(mut self, filter: impl RedactionFilter + 'static) -> Self {
        self.push(Arc::new(filter));
        self
    }

    /// Replace the set of JSON body field names.
    pub fn with_json_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.json_fields = fields
            .into_iter()
            .map(|f| f.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn push(&mut self, filter: Arc<dyn RedactionFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters, in chain order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Whether `field_name` holds a JSON-encoded document.
    pub fn is_json_field(&self, field_name: &str) -> bool {
        self.json_fields.contains(&field_name.to_lowercase())
    }

    /// Run the chain over one value.
    ///
    /// Returns `Ok(None)` when no filter changed it.
    pub fn apply(&self, input: ToRedact<'_>) -> Result<Option<Value>> {
        if is_redacted(input.value) {
            return Ok(None);
        }

        let mut current = Cow::Borrowed(input.value);
        for filter in &self.filters {
            let step = ToRedact {
                field_name: input.field_name,
                value: current.as_ref(),
            };
            if let Some(replaced) = filter.redact(step)? {
                current = Cow::Owned(replaced);
            }
            if is_redacted(&current) {
                break;
            }
        }

        Ok(match current {
            Cow::Owned(value) if value != *input.value => Some(value),
            _ => None,
        })
    }
}

impl Default for RedactionPipeline {
    /// Card-number detection followed by sensitive field names.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(CardNumberFilter::new()),
            Arc::new(SensitiveNameFilter::new()),
        ])
    }
}

impl fmt::Debug for RedactionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut json_fields: Vec<_> = self.json_fields.iter().collect();
        json_fields.sort();
        f.debug_struct("RedactionPipeline")
            .field("filters", &self.filter_names())
            .field("json_fields", &json_fields)
            .finish()
    }
}
