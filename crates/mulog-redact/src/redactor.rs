//! Recursive statement redaction.
//!
//! The walk works on copies: nothing reachable from the caller's statement
//! is modified. Mapping entries run through the chain with their key, so a
//! field-name hit replaces a whole subtree before it is descended into.

use serde_json::{Map, Value};
use tracing::trace;

use mulog_common::{Data, LogStatement};

use crate::filter::{is_falsy, ToRedact};
use crate::pipeline::RedactionPipeline;
use crate::Result;

impl RedactionPipeline {
    /// Redact the message and data of a statement.
    ///
    /// Every other field, adornments included, is carried over as is.
    pub fn redact_statement(&self, statement: &LogStatement) -> Result<LogStatement> {
        let mut redacted = statement.clone();
        if let Some(msg) = &statement.msg {
            redacted.msg = Some(self.redact_message(msg)?);
        }
        if let Some(data) = &statement.data {
            redacted.data = Some(self.redact_data(data)?);
        }
        Ok(redacted)
    }

    /// Run message text through the chain without a field name.
    pub fn redact_message(&self, msg: &str) -> Result<String> {
        if msg.is_empty() {
            return Ok(String::new());
        }
        let value = Value::String(msg.to_string());
        Ok(match self.apply(ToRedact::value(&value))? {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => value_into_string(value),
        })
    }

    /// Redact every entry of a data mapping.
    pub fn redact_data(&self, data: &Data) -> Result<Data> {
        self.redact_map(data)
    }

    /// Redact a free-standing value, e.g. one element of a sequence.
    pub fn redact_value(&self, value: &Value) -> Result<Value> {
        self.redact_entry(None, value)
    }

    fn redact_map(&self, map: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            out.insert(key.clone(), self.redact_entry(Some(key), value)?);
        }
        Ok(out)
    }

    fn redact_entry(&self, field_name: Option<&str>, value: &Value) -> Result<Value> {
        if is_falsy(value) {
            return Ok(value.clone());
        }

        if let (Some(name), Value::String(text)) = (field_name, value) {
            if self.is_json_field(name) {
                if let Some(body) = self.redact_json_body(name, text)? {
                    return Ok(body);
                }
            }
        }

        if let Some(replaced) = self.apply(ToRedact { field_name, value })? {
            return Ok(replaced);
        }

        match value {
            Value::Object(map) => Ok(Value::Object(self.redact_map(map)?)),
            Value::Array(items) => items
                .iter()
                .map(|item| self.redact_entry(None, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Ok(value.clone()),
        }
    }

    /// Redact a JSON document stored as a string.
    ///
    /// Returns `Ok(None)` when the text is not an object or array, leaving
    /// the caller to filter it as a plain string.
    fn redact_json_body(&self, field_name: &str, text: &str) -> Result<Option<Value>> {
        let parsed = match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
            Ok(_) => return Ok(None),
            Err(e) => {
                trace!(field = field_name, error = %e, "body is not JSON, filtering as text");
                return Ok(None);
            }
        };

        // The field name still applies to the document as a whole.
        if let Some(replaced) = self.apply(ToRedact::field(field_name, &parsed))? {
            return Ok(Some(replaced));
        }

        let walked = self.redact_entry(None, &parsed)?;
        Ok(Some(Value::String(serde_json::to_string(&walked)?)))
    }
}

fn value_into_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
