//! Level gate and stream routing.

use mulog_common::{Adornments, LogLevel, LogStatement, Stream};
use mulog_redact::RedactionPipeline;

use crate::error::Result;
use crate::normalize::{normalize, Argument};
use crate::sink::OutputSink;

/// Whether a statement at `statement_level` passes a logger set to
/// `logger_level`. Fatal statements always pass.
pub fn should_emit(logger_level: LogLevel, statement_level: LogLevel) -> bool {
    statement_level == LogLevel::Fatal || statement_level >= logger_level
}

/// Hand a finished statement to the sink method for its stream.
pub fn route(sink: &dyn OutputSink, statement: &LogStatement) -> std::io::Result<()> {
    match Stream::for_level(statement.level) {
        Stream::Stdout => sink.write_info(statement),
        Stream::Warn => sink.write_warn(statement),
        Stream::Error => sink.write_error(statement),
    }
}

/// Everything one log call needs besides its arguments.
pub(crate) struct Emit<'a> {
    pub logger_level: LogLevel,
    pub name: &'a str,
    pub adornments: &'a Adornments,
    pub pipeline: &'a RedactionPipeline,
    pub sink: &'a dyn OutputSink,
}

impl Emit<'_> {
    /// Gate, then normalize, redact and route.
    ///
    /// Arguments are only materialized once the gate has passed. Returns
    /// whether the statement was written.
    pub fn emit<I>(&self, level: LogLevel, args: impl FnOnce() -> I) -> Result<bool>
    where
        I: IntoIterator<Item = Argument>,
    {
        if !should_emit(self.logger_level, level) {
            return Ok(false);
        }

        let statement = normalize(level, self.name, self.adornments, args());
        let redacted = self.pipeline.redact_statement(&statement)?;
        route(self.sink, &redacted)?;
        Ok(true)
    }
}
