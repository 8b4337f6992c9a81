//! mulog command line.
//!
//! - `mulog redact`: scrub JSON documents with a redaction policy
//! - `mulog emit`: log one statement through a configured logger

use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, error};

use mulog_core::exit_codes::ExitCode;
use mulog_core::logging::{init_logging, DiagnosticLevel, LogConfig, LogFormat};
use mulog_core::{
    Argument, ConsoleSink, LevelConfig, LogLevel, LoggerConfig, LoggerRegistry, OutputFormat,
    RedactionPipeline, RedactionPolicy,
};

/// Structured logging with redaction of card numbers and secrets.
#[derive(Parser)]
#[command(name = "mulog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Level of mulog's own diagnostics on stderr
    #[arg(long, global = true)]
    log_level: Option<DiagnosticLevel>,

    /// Format of mulog's own diagnostics
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Redact JSON documents (one per line, or a single document) and print JSONL
    Redact(RedactArgs),

    /// Log a single statement
    Emit(EmitArgs),
}

#[derive(Args, Debug)]
struct RedactArgs {
    /// Input file (stdin when omitted)
    file: Option<PathBuf>,

    /// Redaction policy file (JSON)
    #[arg(long)]
    policy: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EmitArgs {
    /// Logger name
    #[arg(long)]
    name: String,

    /// Statement level
    #[arg(long, default_value = "info")]
    level: LogLevel,

    /// Adornment stamped on the statement (repeatable)
    #[arg(long = "adorn", value_name = "KEY=VALUE", value_parser = parse_adornment)]
    adornments: Vec<(String, String)>,

    /// Statement rendering
    #[arg(long, default_value = "pretty")]
    format: OutputFormat,

    /// Redaction policy file (JSON)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Arguments; values starting with '{' or '[' are parsed as JSON
    args: Vec<String>,
}

fn parse_adornment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    // A subscriber installed by an embedding process is fine to keep.
    let _ = init_logging(&log_config);

    let exit_code = match cli.command {
        Commands::Redact(args) => run_redact(&args),
        Commands::Emit(args) => run_emit(&args),
    };

    std::process::exit(exit_code.as_i32());
}

fn load_pipeline(policy: Option<&Path>) -> Result<RedactionPipeline, ExitCode> {
    let policy = match policy {
        Some(path) => RedactionPolicy::load(path).map_err(|e| {
            eprintln!("mulog: cannot load policy {}: {}", path.display(), e);
            ExitCode::ConfigError
        })?,
        None => RedactionPolicy::default(),
    };
    RedactionPipeline::from_policy(&policy).map_err(|e| {
        eprintln!("mulog: invalid policy: {}", e);
        ExitCode::ConfigError
    })
}

// ============================================================================
// redact
// ============================================================================

fn run_redact(args: &RedactArgs) -> ExitCode {
    let pipeline = match load_pipeline(args.policy.as_deref()) {
        Ok(pipeline) => pipeline,
        Err(code) => return code,
    };

    let input = match read_input(args.file.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("mulog: cannot read input: {}", e);
            return ExitCode::RuntimeError;
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0usize;
    for document in serde_json::Deserializer::from_str(&input).into_iter::<Value>() {
        let document = match document {
            Ok(document) => document,
            Err(e) => {
                eprintln!("mulog: invalid JSON at document {}: {}", count + 1, e);
                return ExitCode::RuntimeError;
            }
        };
        let redacted = match redact_document(&pipeline, document) {
            Ok(redacted) => redacted,
            Err(e) => {
                error!(error = %e, "redaction failed");
                eprintln!("mulog: redaction failed: {}", e);
                return ExitCode::RuntimeError;
            }
        };
        if let Err(e) = writeln!(out, "{}", redacted) {
            eprintln!("mulog: write failed: {}", e);
            return ExitCode::RuntimeError;
        }
        count += 1;
    }

    if let Err(e) = out.flush() {
        eprintln!("mulog: write failed: {}", e);
        return ExitCode::RuntimeError;
    }
    debug!(documents = count, "redacted input");
    ExitCode::Clean
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Redact one document as statement data. A top-level string `msg` is
/// treated as message text.
fn redact_document(
    pipeline: &RedactionPipeline,
    document: Value,
) -> mulog_redact::Result<Value> {
    match document {
        Value::Object(mut fields) => {
            let msg = match fields.remove("msg") {
                Some(Value::String(msg)) => Some(msg),
                Some(other) => {
                    fields.insert("msg".to_string(), other);
                    None
                }
                None => None,
            };
            let mut redacted = pipeline.redact_data(&fields)?;
            if let Some(msg) = msg {
                redacted.insert("msg".to_string(), Value::String(pipeline.redact_message(&msg)?));
            }
            Ok(Value::Object(redacted))
        }
        other => pipeline.redact_value(&other),
    }
}

// ============================================================================
// emit
// ============================================================================

fn run_emit(args: &EmitArgs) -> ExitCode {
    let levels = match LevelConfig::from_env() {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("mulog: {}", e);
            return ExitCode::ConfigError;
        }
    };
    let pipeline = match load_pipeline(args.policy.as_deref()) {
        Ok(pipeline) => pipeline,
        Err(code) => return code,
    };

    let mut config = LoggerConfig::named(&args.name);
    for (key, value) in &args.adornments {
        config = config.with_adornment(key, value);
    }

    let registry = LoggerRegistry::new(
        levels,
        Arc::new(pipeline),
        Arc::new(ConsoleSink::new(args.format)),
    );
    let logger = match registry.named_with(config) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("mulog: {}", e);
            return ExitCode::ConfigError;
        }
    };

    let arguments = match classify_args(&args.args) {
        Ok(arguments) => arguments,
        Err(e) => {
            eprintln!("mulog: {}", e);
            return ExitCode::ConfigError;
        }
    };

    match logger.log(args.level, arguments) {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            eprintln!("mulog: {}", e);
            ExitCode::RuntimeError
        }
    }
}

fn classify_args(raw: &[String]) -> Result<Vec<Argument>, String> {
    raw.iter()
        .map(|arg| {
            if arg.starts_with('{') || arg.starts_with('[') {
                serde_json::from_str::<Value>(arg)
                    .map(Argument::from)
                    .map_err(|e| format!("invalid JSON argument '{}': {}", arg, e))
            } else {
                Ok(Argument::from(arg))
            }
        })
        .collect()
}
