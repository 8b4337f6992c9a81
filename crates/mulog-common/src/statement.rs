//! The canonical log record and captured error payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::level::LogLevel;

/// Free-form nested statement data.
pub type Data = Map<String, Value>;

/// Static key/value markers a logger stamps onto every statement.
pub type Adornments = BTreeMap<String, String>;

/// Returns the unqualified name of `T` (`my_app::model::User` becomes `User`).
///
/// Generic parameters are dropped, so `Vec<u8>` becomes `Vec`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// A captured error, flattened into plain serializable data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Short type name of the error.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Display text of the error.
    pub message: String,

    /// Captured backtrace, when the caller provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// Display text of each `source()` in the chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack: None,
            causes: Vec::new(),
        }
    }

    /// Capture an error value, including its source chain.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            type_name: short_type_name::<E>(),
            message: err.to_string(),
            stack: None,
            causes,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// One normalized log record.
///
/// `err` and `errs` are never populated together: the first captured error
/// lives in `err`, and a second one moves both into `errs`. Use
/// [`LogStatement::push_error`] to keep that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct LogStatement {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub name: String,
    pub clazz: Option<String>,
    pub func: Option<String>,
    pub msg: Option<String>,
    pub err: Option<ErrorInfo>,
    pub errs: Option<Vec<ErrorInfo>>,
    pub data: Option<Data>,
    pub adornments: Adornments,
}

impl LogStatement {
    /// Create an empty statement stamped with the current time.
    pub fn new(level: LogLevel, name: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, name)
    }

    /// Create an empty statement with an explicit timestamp.
    pub fn at(at: DateTime<Utc>, level: LogLevel, name: impl Into<String>) -> Self {
        Self {
            at,
            level,
            name: name.into(),
            clazz: None,
            func: None,
            msg: None,
            err: None,
            errs: None,
            data: None,
            adornments: Adornments::new(),
        }
    }

    /// Record a captured error, promoting `err` into `errs` on the second one.
    pub fn push_error(&mut self, error: ErrorInfo) {
        if let Some(errs) = self.errs.as_mut() {
            errs.push(error);
        } else if let Some(first) = self.err.take() {
            self.errs = Some(vec![first, error]);
        } else {
            self.err = Some(error);
        }
    }

    /// All captured errors in arrival order.
    pub fn errors(&self) -> Vec<&ErrorInfo> {
        match (&self.err, &self.errs) {
            (_, Some(errs)) => errs.iter().collect(),
            (Some(err), None) => vec![err],
            (None, None) => Vec::new(),
        }
    }

    /// Serialize to a JSON value (adornments applied).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","name":"{}"}}"#,
                self.name
            )
        })
    }

    /// Serialize to indented multi-line JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_jsonl())
    }
}

/// Field order is chosen for readability: identity and message first, the
/// timestamp last. An adornment with the same key as a statement field
/// replaces that field in the output.
impl Serialize for LogStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let free = |key: &str| !self.adornments.contains_key(key);
        let mut map = serializer.serialize_map(None)?;

        if let Some(clazz) = &self.clazz {
            if free("clazz") {
                map.serialize_entry("clazz", clazz)?;
            }
        }
        if free("name") {
            map.serialize_entry("name", &self.name)?;
        }
        if let Some(func) = &self.func {
            if free("func") {
                map.serialize_entry("func", func)?;
            }
        }
        if let Some(msg) = &self.msg {
            if free("msg") {
                map.serialize_entry("msg", msg)?;
            }
        }
        if let Some(data) = &self.data {
            if free("data") {
                map.serialize_entry("data", data)?;
            }
        }
        if free("level") {
            map.serialize_entry("level", &self.level)?;
        }
        if let Some(err) = &self.err {
            if free("err") {
                map.serialize_entry("err", err)?;
            }
        }
        if let Some(errs) = &self.errs {
            if free("errs") {
                map.serialize_entry("errs", errs)?;
            }
        }
        for (key, value) in &self.adornments {
            if key != "at" {
                map.serialize_entry(key, value)?;
            }
        }
        match self.adornments.get("at") {
            Some(value) => map.serialize_entry("at", value)?,
            None => map.serialize_entry("at", &self.at)?,
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk full")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "write failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<ErrorInfo>(), "ErrorInfo");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
        assert_eq!(short_type_name::<str>(), "str");
    }

    #[test]
    fn test_error_info_captures_chain() {
        let info = ErrorInfo::from_error(&Outer(Inner));
        assert_eq!(info.type_name, "Outer");
        assert_eq!(info.message, "write failed");
        assert_eq!(info.causes, vec!["disk full".to_string()]);
    }

    #[test]
    fn test_push_error_promotes() {
        let mut statement = LogStatement::new(LogLevel::Error, "test");
        statement.push_error(ErrorInfo::new("A", "first"));
        assert!(statement.err.is_some());
        assert!(statement.errs.is_none());

        statement.push_error(ErrorInfo::new("B", "second"));
        assert!(statement.err.is_none());
        assert_eq!(statement.errs.as_ref().map(Vec::len), Some(2));

        statement.push_error(ErrorInfo::new("C", "third"));
        assert!(statement.err.is_none());
        let messages: Vec<_> = statement.errors().iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let statement = LogStatement::new(LogLevel::Info, "svc");
        let value = statement.to_value();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.get("name"), Some(&Value::String("svc".into())));
        assert_eq!(obj.get("level"), Some(&Value::String("info".into())));
        assert!(obj.contains_key("at"));
        assert!(!obj.contains_key("msg"));
        assert!(!obj.contains_key("data"));
        assert!(!obj.contains_key("err"));
    }

    #[test]
    fn test_adornments_override_fields() {
        let mut statement = LogStatement::new(LogLevel::Info, "svc");
        statement.msg = Some("hello".into());
        statement.adornments.insert("framework".into(), "mulog".into());
        statement.adornments.insert("name".into(), "override".into());

        let value = statement.to_value();
        assert_eq!(value["framework"], "mulog");
        assert_eq!(value["name"], "override");
        assert_eq!(value["msg"], "hello");
    }

    #[test]
    fn test_error_serialization_uses_type_key() {
        let json = serde_json::to_string(&ErrorInfo::new("IoError", "boom")).unwrap();
        assert!(json.contains(r#""type":"IoError""#));
        assert!(!json.contains("stack"));
        assert!(!json.contains("causes"));
    }
}
