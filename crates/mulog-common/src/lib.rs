//! mulog shared types.
//!
//! This crate provides the value types shared by the redaction engine and
//! the logger:
//! - Severity levels and the output stream each level routes to
//! - The canonical log statement and its serialized shape
//! - Captured error payloads

pub mod error;
pub mod level;
pub mod statement;

pub use error::LevelParseError;
pub use level::{LogLevel, Stream};
pub use statement::{short_type_name, Adornments, Data, ErrorInfo, LogStatement};
