//! Fuzz target for `LOG_LEVEL` string parsing.
//!
//! Parsing should never panic, only return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mulog_core::LevelConfig;

fuzz_target!(|input: &str| {
    if let Ok(config) = LevelConfig::parse(input) {
        let _ = config.level_for("fuzz");
    }
});
