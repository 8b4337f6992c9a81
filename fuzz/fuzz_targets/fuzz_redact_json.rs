//! Fuzz target for recursive redaction of arbitrary JSON documents.
//!
//! Any document that parses must redact without panicking, and redacting
//! the result again must change nothing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mulog_redact::RedactionPipeline;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let pipeline = RedactionPipeline::default();
    if let Ok(once) = pipeline.redact_value(&document) {
        let twice = pipeline.redact_value(&once).expect("second pass should succeed");
        assert_eq!(once, twice);
    }
});
