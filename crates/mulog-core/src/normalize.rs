//! Statement normalization.
//!
//! Call sites pass a heterogeneous list of [`Argument`]s. The normalizer
//! folds them, left to right, into one [`LogStatement`]:
//!
//! - `func`: the first text ending in `()`, else the first structured `func`.
//! - `msg`: the first other text, else the first structured `msg`, else the
//!   first error's message. Empty strings count as absent everywhere.
//! - `clazz`: the first structured `clazz`.
//! - errors: the first lands in `err`; a second moves both into `errs`.
//! - structured fields merge into `data` (later keys win); typed values nest
//!   under their type name.
//!
//! Each field is decided by rule priority first and arrival order second,
//! so reordering arguments of different kinds never changes the result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use mulog_common::{short_type_name, Adornments, Data, ErrorInfo, LogLevel, LogStatement};

/// Suffix marking a text argument as a function name.
pub const FUNC_SUFFIX: &str = "()";

/// One call-site argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Message text, or a function name when it ends in `()`.
    Text(String),

    /// A captured error.
    Failure(ErrorInfo),

    /// A record of named fields.
    ///
    /// Plain records (`type_name == None`) merge into `data`; typed records
    /// nest under `data[type_name]`.
    Structured {
        type_name: Option<String>,
        clazz: Option<String>,
        func: Option<String>,
        msg: Option<String>,
        fields: Map<String, Value>,
    },

    /// Anything that could not be classified. Ignored.
    Opaque(Value),
}

impl Argument {
    /// Capture an error value.
    pub fn error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Argument::Failure(ErrorInfo::from_error(err))
    }

    /// A typed record, nested under the short type name of `T`.
    ///
    /// `clazz`, `func` and `msg` fields are read for classification but stay
    /// in the nested record. Values that do not serialize to an object are
    /// opaque.
    pub fn typed<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Argument::Structured {
                type_name: Some(short_type_name::<T>()),
                clazz: fields.get("clazz").and_then(lift),
                func: fields.get("func").and_then(lift),
                msg: fields.get("msg").and_then(lift),
                fields,
            },
            Ok(other) => Argument::Opaque(other),
            Err(_) => Argument::Opaque(Value::Null),
        }
    }

    /// A plain record with `clazz`, `func` and `msg` lifted out of `fields`.
    pub fn plain(mut fields: Map<String, Value>) -> Self {
        let clazz = fields.remove("clazz");
        let func = fields.remove("func");
        let msg = fields.remove("msg");
        Argument::Structured {
            type_name: None,
            clazz: clazz.as_ref().and_then(lift),
            func: func.as_ref().and_then(lift),
            msg: msg.as_ref().and_then(lift),
            fields,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, Argument::Opaque(Value::Null))
    }
}

/// Text form of a classification field. Null, `false` and `""` count as absent.
fn lift(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl From<&str> for Argument {
    fn from(text: &str) -> Self {
        Argument::Text(text.to_string())
    }
}

impl From<String> for Argument {
    fn from(text: String) -> Self {
        Argument::Text(text)
    }
}

impl From<&String> for Argument {
    fn from(text: &String) -> Self {
        Argument::Text(text.clone())
    }
}

impl From<ErrorInfo> for Argument {
    fn from(error: ErrorInfo) -> Self {
        Argument::Failure(error)
    }
}

impl From<Map<String, Value>> for Argument {
    fn from(fields: Map<String, Value>) -> Self {
        Argument::plain(fields)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Argument::plain(fields),
            Value::String(text) => Argument::Text(text),
            other => Argument::Opaque(other),
        }
    }
}

/// Classification candidates, kept per rule so priority beats arrival order.
#[derive(Default)]
struct Fold {
    clazz: Option<String>,
    text_func: Option<String>,
    record_func: Option<String>,
    text_msg: Option<String>,
    record_msg: Option<String>,
    errors: Vec<ErrorInfo>,
    data: Option<Data>,
}

impl Fold {
    fn push(&mut self, arg: Argument) {
        match arg {
            // Empty text is absent and never claims a slot.
            Argument::Text(text) if text.is_empty() => {}
            Argument::Text(text) => {
                let slot = if text.ends_with(FUNC_SUFFIX) {
                    &mut self.text_func
                } else {
                    &mut self.text_msg
                };
                slot.get_or_insert(text);
            }
            Argument::Failure(error) => self.errors.push(error),
            Argument::Structured {
                type_name,
                clazz,
                func,
                msg,
                fields,
            } => {
                if self.clazz.is_none() {
                    self.clazz = clazz;
                }
                if self.record_func.is_none() {
                    self.record_func = func;
                }
                if self.record_msg.is_none() {
                    self.record_msg = msg;
                }
                match type_name {
                    Some(type_name) => {
                        self.data
                            .get_or_insert_with(Map::new)
                            .insert(type_name, Value::Object(fields));
                    }
                    None if !fields.is_empty() => {
                        self.data.get_or_insert_with(Map::new).extend(fields);
                    }
                    None => {}
                }
            }
            Argument::Opaque(_) => {}
        }
    }

    fn finish(self, statement: &mut LogStatement) {
        statement.clazz = self.clazz;
        statement.func = self.text_func.or(self.record_func);
        statement.msg = self
            .text_msg
            .or(self.record_msg)
            .or_else(|| {
                self.errors
                    .iter()
                    .map(|e| &e.message)
                    .find(|m| !m.is_empty())
                    .cloned()
            });
        for error in self.errors {
            statement.push_error(error);
        }
        statement.data = self.data;
    }
}

/// Fold `args` into a statement stamped with the current time.
pub fn normalize<I>(level: LogLevel, name: &str, adornments: &Adornments, args: I) -> LogStatement
where
    I: IntoIterator<Item = Argument>,
{
    normalize_at(Utc::now(), level, name, adornments, args)
}

/// Fold `args` into a statement with an explicit timestamp.
pub fn normalize_at<I>(
    at: DateTime<Utc>,
    level: LogLevel,
    name: &str,
    adornments: &Adornments,
    args: I,
) -> LogStatement
where
    I: IntoIterator<Item = Argument>,
{
    let mut fold = Fold::default();
    for arg in args.into_iter().filter(|arg| !arg.is_null()) {
        fold.push(arg);
    }

    let mut statement = LogStatement::at(at, level, name);
    fold.finish(&mut statement);
    statement.adornments = adornments.clone();
    statement
}
