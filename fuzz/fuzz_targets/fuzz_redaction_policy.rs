//! Fuzz target for redaction policy files.
//!
//! Tests that policy parsing and pipeline construction handle arbitrary
//! input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mulog_redact::{RedactionPipeline, RedactionPolicy};

fuzz_target!(|data: &[u8]| {
    if let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) {
        let _ = RedactionPipeline::from_policy(&policy);
    }
});
