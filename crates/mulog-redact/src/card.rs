//! Payment-card and bank-account number detection.
//!
//! Card numbers leaking into logs are a PCI risk, so anything shaped like
//! a card or account number is replaced aggressively. The detector only
//! looks at values; field names are ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::filter::{RedactionFilter, ToRedact, SENTINEL};
use crate::Result;

/// Shortest string worth scanning.
pub const DEFAULT_MIN_LENGTH: usize = 12;

/// Digit count of numeric values that are treated as card numbers.
const CARD_NUMBER_DIGITS: u32 = 16;

/// A digit pattern replaced by the cascade.
struct DigitPattern {
    pattern: Lazy<Regex>,
    replacement: &'static str,
    description: &'static str,
}

// Order matters: each pattern only sees what the previous ones left behind.
static PATTERNS: [DigitPattern; 4] = [
    DigitPattern {
        pattern: Lazy::new(|| Regex::new(r"\b[0-9]{12,17}\b").unwrap()),
        replacement: SENTINEL,
        description: "Bare account or bank number",
    },
    DigitPattern {
        pattern: Lazy::new(|| {
            Regex::new(concat!(
                r"(^|[^0-9])(",
                r"4[0-9]{12}(?:[0-9]{3})?",      // Visa
                r"|5[1-5][0-9]{14}",             // MasterCard
                r"|3[47][0-9]{13}",              // American Express
                r"|3(?:0[0-5]|[68][0-9])[0-9]{11}", // Diners Club
                r"|6(?:011|5[0-9]{2})[0-9]{12}", // Discover
                r")([^0-9]|$)",
            ))
            .unwrap()
        }),
        // Keeps the non-digit neighbours captured around the number.
        replacement: "${1}>>> REDACTED <<<${3}",
        description: "Card number by issuer prefix",
    },
    DigitPattern {
        pattern: Lazy::new(|| {
            Regex::new(r"\b[0-9]{4}[ -][0-9]{4}[ -][0-9]{4}[ -][0-9]{1,4}\b").unwrap()
        }),
        replacement: SENTINEL,
        description: "Card number in 4-4-4-4 groups",
    },
    DigitPattern {
        pattern: Lazy::new(|| Regex::new(r"\b[0-9]{4}[ -][0-9]{6}[ -][0-9]{5}\b").unwrap()),
        replacement: SENTINEL,
        description: "Card number in 4-6-5 groups",
    },
];

/// Value filter for card-number and account-number shaped data.
#[derive(Debug, Clone)]
pub struct CardNumberFilter {
    min_length: usize,
}

impl CardNumberFilter {
    pub fn new() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }

    /// Use a different minimum string length before scanning.
    pub fn with_min_length(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Redact card-shaped digit runs inside `text`.
    ///
    /// Returns `None` when nothing matched.
    pub fn redact_text(&self, text: &str) -> Option<String> {
        if text == SENTINEL || text.chars().count() < self.min_length {
            return None;
        }

        let mut result = text.to_string();
        for pattern in &PATTERNS {
            // Matches may share a boundary character, so one pass can leave
            // a neighbour behind. Every replacement removes digits, so this
            // terminates.
            while pattern.pattern.is_match(&result) {
                let next = pattern
                    .pattern
                    .replace_all(&result, pattern.replacement)
                    .into_owned();
                if next == result {
                    break;
                }
                trace!(pattern = pattern.description, "card number pattern matched");
                result = next;
            }
        }

        (result != text).then_some(result)
    }

    fn redact_number(&self, number: &serde_json::Number) -> Option<Value> {
        let digits = if let Some(u) = number.as_u64() {
            digit_count(u)
        } else if let Some(i) = number.as_i64() {
            digit_count(i.unsigned_abs())
        } else {
            let f = number.as_f64()?.abs();
            if f.fract() != 0.0 || !(1e15..1e16).contains(&f) {
                return None;
            }
            CARD_NUMBER_DIGITS
        };

        // The replacement changes the JSON type from number to string.
        (digits == CARD_NUMBER_DIGITS).then(|| Value::String(SENTINEL.to_string()))
    }
}

impl Default for CardNumberFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RedactionFilter for CardNumberFilter {
    fn name(&self) -> &str {
        "card_number"
    }

    fn redact(&self, input: ToRedact<'_>) -> Result<Option<Value>> {
        Ok(match input.value {
            Value::String(s) => self.redact_text(s).map(Value::String),
            Value::Number(n) => self.redact_number(n),
            _ => None,
        })
    }
}

fn digit_count(mut n: u64) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
