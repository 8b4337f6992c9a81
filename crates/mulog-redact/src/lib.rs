//! Redaction filter chain for mulog statements.
//!
//! A [`RedactionPipeline`] holds an ordered list of [`RedactionFilter`]s and
//! walks a statement's message and data, replacing anything that looks
//! sensitive with [`SENTINEL`].
//!
//! # Key Features
//!
//! - **Value detection**: card and account numbers, bare or grouped, even
//!   when glued to surrounding text.
//! - **Field names**: values under names like `password` or `bank account`
//!   are redacted without looking at them.
//! - **Deep walk**: nested mappings, sequences and JSON documents carried as
//!   strings in body fields.
//! - **Copy on redact**: the caller's statement is never modified.
//!
//! # Example
//!
//! ```
//! use mulog_common::{LogLevel, LogStatement};
//! use mulog_redact::{RedactionPipeline, SENTINEL};
//! use serde_json::json;
//!
//! let pipeline = RedactionPipeline::default();
//!
//! let mut statement = LogStatement::new(LogLevel::Info, "payments");
//! statement.data = json!({"password": "hunter2"}).as_object().cloned();
//!
//! let redacted = pipeline.redact_statement(&statement).unwrap();
//! assert_eq!(redacted.data.unwrap()["password"], json!(SENTINEL));
//! ```

pub mod card;
pub mod error;
pub mod field_name;
pub mod filter;
pub mod pattern;
pub mod pipeline;
pub mod policy;
mod redactor;

pub use card::CardNumberFilter;
pub use error::{RedactionError, Result};
pub use field_name::{SensitiveNameFilter, SENSITIVE_FIELD_NAMES};
pub use filter::{is_falsy, is_redacted, RedactionFilter, ToRedact, SENTINEL};
pub use pattern::PatternFilter;
pub use pipeline::RedactionPipeline;
pub use policy::{DetectionPattern, RedactionPolicy, DEFAULT_JSON_FIELDS, POLICY_SCHEMA_VERSION};
