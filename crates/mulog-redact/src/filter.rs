//! The redaction filter contract.

use serde_json::Value;

use crate::Result;

/// Replacement text for every redacted value.
///
/// Consumers parsing redacted logs must treat this exact literal as the
/// redaction signal.
pub const SENTINEL: &str = ">>> REDACTED <<<";

/// Input handed to a filter: a value and, when it sits in a mapping, its key.
#[derive(Debug, Clone, Copy)]
pub struct ToRedact<'a> {
    /// Key of the value in its parent mapping. `None` for message text and
    /// sequence elements.
    pub field_name: Option<&'a str>,
    pub value: &'a Value,
}

impl<'a> ToRedact<'a> {
    pub fn value(value: &'a Value) -> Self {
        Self {
            field_name: None,
            value,
        }
    }

    pub fn field(field_name: &'a str, value: &'a Value) -> Self {
        Self {
            field_name: Some(field_name),
            value,
        }
    }
}

/// A single stateless redaction step.
///
/// Filters are pure: the same input always yields the same output and
/// nothing outside the returned value changes. Returning `Ok(None)` leaves
/// the value as it was; `Ok(Some(v))` replaces it with `v`. An `Err` fails
/// the whole log call.
pub trait RedactionFilter: Send + Sync {
    /// Short identifier used in error reports.
    fn name(&self) -> &str;

    fn redact(&self, input: ToRedact<'_>) -> Result<Option<Value>>;
}

/// Whether a value is already the sentinel.
pub fn is_redacted(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == SENTINEL)
}

/// `null`, `false`, `0` and `""` cannot carry sensitive content and are
/// never handed to filters.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// The sentinel as a JSON value.
pub fn sentinel() -> Value {
    Value::String(SENTINEL.to_string())
}
