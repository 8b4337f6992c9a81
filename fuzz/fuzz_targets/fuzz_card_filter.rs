//! Fuzz target for card number detection in free text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mulog_redact::CardNumberFilter;

fuzz_target!(|text: &str| {
    let filter = CardNumberFilter::new();
    if let Some(once) = filter.redact_text(text) {
        assert_eq!(filter.redact_text(&once), None);
    }
});
