//! Output sinks.
//!
//! A sink receives statements that already passed the level gate and the
//! redaction pipeline. Which of the three methods is called depends only on
//! the statement's level.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mulog_common::{LogStatement, Stream};

/// Destination for finished statements.
pub trait OutputSink: Send + Sync {
    /// trace, debug and info statements.
    fn write_info(&self, statement: &LogStatement) -> io::Result<()>;

    /// warn statements.
    fn write_warn(&self, statement: &LogStatement) -> io::Result<()>;

    /// error and fatal statements.
    fn write_error(&self, statement: &LogStatement) -> io::Result<()>;
}

/// How a statement is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented multi-line JSON.
    #[default]
    Pretty,
    /// One JSON object per line.
    Jsonl,
}

impl OutputFormat {
    pub fn render(self, statement: &LogStatement) -> String {
        match self {
            OutputFormat::Pretty => statement.to_json_pretty(),
            OutputFormat::Jsonl => statement.to_jsonl(),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "human" => Ok(OutputFormat::Pretty),
            "jsonl" | "json" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Writes info statements to stdout and warn/error statements to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl OutputSink for ConsoleSink {
    fn write_info(&self, statement: &LogStatement) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", self.format.render(statement))
    }

    fn write_warn(&self, statement: &LogStatement) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", self.format.render(statement))
    }

    fn write_error(&self, statement: &LogStatement) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", self.format.render(statement))
    }
}

type SharedWriter = Mutex<Box<dyn Write + Send>>;

/// Writes to arbitrary writers: one for info, one for warn and error.
pub struct WriterSink {
    format: OutputFormat,
    out: SharedWriter,
    err: SharedWriter,
}

impl WriterSink {
    pub fn new<O, E>(format: OutputFormat, out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            format,
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }

    fn write_to(&self, writer: &SharedWriter, statement: &LogStatement) -> io::Result<()> {
        let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", self.format.render(statement))?;
        writer.flush()
    }
}

impl OutputSink for WriterSink {
    fn write_info(&self, statement: &LogStatement) -> io::Result<()> {
        self.write_to(&self.out, statement)
    }

    fn write_warn(&self, statement: &LogStatement) -> io::Result<()> {
        self.write_to(&self.err, statement)
    }

    fn write_error(&self, statement: &LogStatement) -> io::Result<()> {
        self.write_to(&self.err, statement)
    }
}

/// Keeps every statement in memory, tagged with the stream it was sent to.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Stream, Value)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn records(&self) -> Vec<(Stream, Value)> {
        self.lock().clone()
    }

    /// Statements written to one stream.
    pub fn on(&self, stream: Stream) -> Vec<Value> {
        self.lock()
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Value> {
        self.lock().last().map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Stream, Value)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, stream: Stream, statement: &LogStatement) -> io::Result<()> {
        self.lock().push((stream, statement.to_value()));
        Ok(())
    }
}

impl OutputSink for MemorySink {
    fn write_info(&self, statement: &LogStatement) -> io::Result<()> {
        self.push(Stream::Stdout, statement)
    }

    fn write_warn(&self, statement: &LogStatement) -> io::Result<()> {
        self.push(Stream::Warn, statement)
    }

    fn write_error(&self, statement: &LogStatement) -> io::Result<()> {
        self.push(Stream::Error, statement)
    }
}
