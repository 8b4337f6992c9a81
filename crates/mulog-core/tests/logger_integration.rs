//! End-to-end tests: registry, loggers, redaction and sinks together.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use mulog_core::{
    log_args, Argument, ConfigError, ErrorInfo, LevelConfig, LogError, LogLevel, Logger,
    LoggerConfig, LoggerRegistry, MemorySink, OutputFormat, RedactionPipeline, Stream,
    WriterSink, SENTINEL,
};
use mulog_redact::{RedactionError, RedactionFilter, ToRedact};
use serde::Serialize;
use serde_json::{json, Value};

fn registry(levels: &str) -> (LoggerRegistry, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let registry = LoggerRegistry::new(
        LevelConfig::parse(levels).unwrap(),
        Arc::new(RedactionPipeline::default()),
        sink.clone(),
    );
    (registry, sink)
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Registry and level configuration
// ============================================================================

#[test]
fn test_overrides_apply_by_component_name() {
    let (registry, sink) = registry("warn;Database debug");

    let db = registry.named("database").unwrap();
    let api = registry.named("api").unwrap();
    assert_eq!(db.level(), LogLevel::Debug);
    assert_eq!(api.level(), LogLevel::Warn);

    db.debug(log_args!["connected"]).unwrap();
    api.info(log_args!["request"]).unwrap();
    api.warn(log_args!["slow request"]).unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, Stream::Stdout);
    assert_eq!(records[0].1["name"], "database");
    assert_eq!(records[1].0, Stream::Warn);
    assert_eq!(records[1].1["msg"], "slow request");
}

#[test]
fn test_registry_returns_cached_logger() {
    let (registry, _sink) = registry("info");
    let first = registry.named("Cache").unwrap();
    let second = registry.named("cache").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);

    first.set_level(LogLevel::Error);
    assert_eq!(second.level(), LogLevel::Error);
}

#[test]
fn test_default_level_change_leaves_existing_loggers() {
    let (registry, sink) = registry("info");
    let existing = registry.named("existing").unwrap();

    registry.set_default_level(LogLevel::Error);
    let fresh = registry.named("fresh").unwrap();

    assert_eq!(existing.level(), LogLevel::Info);
    assert_eq!(fresh.level(), LogLevel::Error);
    assert_eq!(registry.default_logger().level(), LogLevel::Error);

    registry.default_logger().warn(log_args!["dropped"]).unwrap();
    existing.info(log_args!["kept"]).unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.last().unwrap()["msg"], "kept");
}

#[test]
fn test_missing_name_is_rejected() {
    let (registry, _sink) = registry("info");
    assert!(matches!(registry.named("  "), Err(ConfigError::MissingName)));
    assert!(matches!(
        registry.named_with(LoggerConfig::default()),
        Err(ConfigError::MissingName)
    ));
}

#[test]
fn test_invalid_level_config() {
    assert!(matches!(
        LevelConfig::parse("chatty"),
        Err(ConfigError::InvalidLevel(_))
    ));
    assert!(matches!(
        LevelConfig::parse("info;db"),
        Err(ConfigError::InvalidOverride { .. })
    ));
}

#[test]
fn test_registry_adornments_reach_every_statement() {
    let (registry, sink) = registry("info");
    let registry = registry.with_adornments(
        [("service".to_string(), "billing".to_string())]
            .into_iter()
            .collect(),
    );
    let logger = registry
        .named_with(LoggerConfig::named("invoices").with_adornment("region", "eu"))
        .unwrap();

    logger.info(log_args!["issued"]).unwrap();
    registry.default_logger().info(log_args!["root"]).unwrap();

    let records = sink.on(Stream::Stdout);
    assert_eq!(records[0]["service"], "billing");
    assert_eq!(records[0]["region"], "eu");
    assert_eq!(records[1]["service"], "billing");
    assert!(records[1].get("region").is_none());
}

// ============================================================================
// Redaction end to end
// ============================================================================

#[derive(Serialize)]
struct Payment {
    card: String,
    amount: u32,
}

#[test]
fn test_card_numbers_never_reach_the_sink() {
    let (registry, sink) = registry("trace");
    let logger = registry.named("payments").unwrap();

    logger
        .info(log_args![
            "charge()",
            "charging 4111-1111-1111-1111",
            json!({"secret": "abc", "body": "{\"pan\":\"5500 0000 0000 0004\"}"}),
            Argument::typed(&Payment {
                card: "378282246310005".to_string(),
                amount: 42,
            }),
        ])
        .unwrap();

    let record = sink.last().unwrap();
    let text = record.to_string();
    for leaked in ["4111-1111-1111-1111", "5500 0000 0000 0004", "378282246310005", "abc"] {
        assert!(!text.contains(leaked), "{leaked} leaked into {text}");
    }

    assert_eq!(record["func"], "charge()");
    assert_eq!(record["msg"], format!("charging {}", SENTINEL));
    assert_eq!(record["data"]["secret"], SENTINEL);
    assert_eq!(record["data"]["Payment"]["card"], SENTINEL);
    assert_eq!(record["data"]["Payment"]["amount"], 42);

    let body: Value = serde_json::from_str(record["data"]["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["pan"], SENTINEL);
}

#[test]
fn test_gated_statement_is_never_built() {
    let (registry, sink) = registry("error");
    let logger = registry.named("quiet").unwrap();

    logger
        .log_with(LogLevel::Info, || -> Vec<Argument> {
            panic!("arguments built for a suppressed statement")
        })
        .unwrap();
    logger.fatal(log_args!["always"]).unwrap();

    assert_eq!(sink.on(Stream::Error).len(), 1);
    assert_eq!(sink.len(), 1);
}

struct Refuse;

impl RedactionFilter for Refuse {
    fn name(&self) -> &str {
        "refuse"
    }

    fn redact(&self, input: ToRedact<'_>) -> mulog_redact::Result<Option<Value>> {
        if input.field_name == Some("poison") {
            return Err(RedactionError::filter("refuse", "poisoned field"));
        }
        Ok(None)
    }
}

#[test]
fn test_redaction_failure_writes_nothing() {
    let sink = Arc::new(MemorySink::new());
    let pipeline = RedactionPipeline::default().with_filter(Refuse);
    let logger = Logger::new(LoggerConfig::named("strict"), Arc::new(pipeline), sink.clone())
        .unwrap();

    let err = logger
        .error(log_args!["bad", json!({"poison": "x"})])
        .unwrap_err();
    assert!(matches!(err, LogError::Redaction(_)));
    assert!(sink.is_empty());

    logger.error(log_args!["fine", json!({"ok": 1})]).unwrap();
    assert_eq!(sink.len(), 1);
}

// ============================================================================
// Errors, children and timers
// ============================================================================

#[test]
fn test_two_errors_move_into_errs() {
    let (registry, sink) = registry("info");
    let logger = registry.named("jobs").unwrap();
    let io_err = io::Error::new(io::ErrorKind::NotFound, "missing spool");

    logger
        .error(log_args![
            Argument::error(&io_err),
            ErrorInfo::new("Timeout", "took too long"),
        ])
        .unwrap();

    let record = sink.last().unwrap();
    assert!(record.get("err").is_none());
    let errs = record["errs"].as_array().unwrap();
    assert_eq!(errs.len(), 2);
    assert_eq!(errs[0]["message"], "missing spool");
    assert_eq!(errs[1]["type"], "Timeout");
    assert_eq!(record["msg"], "missing spool");
}

#[test]
fn test_child_inherits_parent() {
    let (registry, sink) = registry("warn");
    let parent = registry
        .named_with(LoggerConfig::named("http").with_adornment("service", "edge"))
        .unwrap();
    let child = parent.child("router").unwrap();
    let chatty = parent
        .child_with(LoggerConfig::named("tls").with_level(LogLevel::Debug))
        .unwrap();

    assert_eq!(child.name(), "http.router");
    assert_eq!(child.level(), LogLevel::Warn);
    assert_eq!(chatty.level(), LogLevel::Debug);

    child.info(log_args!["dropped"]).unwrap();
    chatty.debug(log_args!["handshake"]).unwrap();

    let record = sink.last().unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(record["name"], "http.tls");
    assert_eq!(record["service"], "edge");
}

#[test]
fn test_timer_logs_duration() {
    let (registry, sink) = registry("debug");
    let logger = registry.named("import").unwrap();

    logger.start("load");
    assert!(logger.is_timing("load"));
    assert!(logger.stop("load", None).unwrap());
    assert!(!logger.is_timing("load"));
    assert!(!logger.stop("load", None).unwrap());

    let record = sink.last().unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(record["level"], "debug");
    assert_eq!(record["msg"], "load");
    assert_eq!(record["data"]["label"], "load");
    assert!(record["data"]["durationMs"].is_u64());
}

#[test]
fn test_timer_respects_gate() {
    let (registry, sink) = registry("info");
    let logger = registry.named("import").unwrap();

    logger.start("quiet");
    assert!(logger.stop("quiet", None).unwrap());
    assert!(sink.is_empty());

    logger.start("loud");
    assert!(logger.stop("loud", Some(LogLevel::Warn)).unwrap());
    assert_eq!(sink.on(Stream::Warn).len(), 1);
}

// ============================================================================
// Writer sink
// ============================================================================

#[test]
fn test_writer_sink_splits_streams() {
    let out = Buffer::default();
    let err = Buffer::default();
    let sink = Arc::new(WriterSink::new(OutputFormat::Jsonl, out.clone(), err.clone()));
    let logger = Logger::new(
        LoggerConfig::named("worker").with_level(LogLevel::Trace),
        Arc::new(RedactionPipeline::default()),
        sink,
    )
    .unwrap();

    logger.trace(log_args!["tick"]).unwrap();
    logger.warn(log_args!["lagging"]).unwrap();
    logger.error(log_args!["crashed", json!({"password": "pw"})]).unwrap();

    let out_lines: Vec<Value> = out
        .text()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let err_lines: Vec<Value> = err
        .text()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(out_lines.len(), 1);
    assert_eq!(out_lines[0]["msg"], "tick");
    assert_eq!(err_lines.len(), 2);
    assert_eq!(err_lines[0]["level"], "warn");
    assert_eq!(err_lines[1]["data"]["password"], SENTINEL);
}
