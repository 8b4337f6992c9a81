//! Field-name based redaction.
//!
//! This filter is pessimistic: it never inspects the value, it only looks
//! for field names that hint at sensitive content and redacts whatever they
//! hold. Matching is exact after normalization, so `passenger` is safe even
//! though `pass` is a sensitive name.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::filter::{sentinel, RedactionFilter, ToRedact};
use crate::Result;

/// Field names (lower case) whose values are always redacted.
pub const SENSITIVE_FIELD_NAMES: &[&str] = &[
    "card",
    "card number",
    "card-number",
    "cardnumber",
    "credit card",
    "credit-card",
    "creditcard",
    "credit card number",
    "credit-card-number",
    "creditcard-number",
    "credit-cardnumber",
    "creditcardnumber",
    "account number",
    "account-number",
    "accountnumber",
    "bank",
    "bank account",
    "bank-account",
    "bankaccount",
    "bank account number",
    "bank-account-number",
    "bank-accountnumber",
    "bankaccount-number",
    "bankaccountnumber",
    "routing number",
    "routing-number",
    "routingnumber",
    "pass",
    "password",
    "secret",
    "shared secret",
    "shared-secret",
    "sharedsecret",
];

static RE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").unwrap());

/// Redacts values stored under sensitive field names.
#[derive(Debug, Clone)]
pub struct SensitiveNameFilter {
    names: HashSet<String>,
}

impl SensitiveNameFilter {
    /// Filter over [`SENSITIVE_FIELD_NAMES`].
    pub fn new() -> Self {
        Self::with_extra_names(std::iter::empty::<String>())
    }

    /// Filter over [`SENSITIVE_FIELD_NAMES`] plus `extra` names.
    pub fn with_extra_names<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = SENSITIVE_FIELD_NAMES
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(|name| name.as_ref().to_lowercase()))
            .collect();
        Self { names }
    }

    /// Whether `field_name` is sensitive.
    ///
    /// The name is compared lower-cased, then again with every character
    /// that is neither alphanumeric nor whitespace removed.
    pub fn is_sensitive(&self, field_name: &str) -> bool {
        let lower = field_name.to_lowercase();
        if self.names.contains(&lower) {
            return true;
        }
        let stripped = RE_PUNCTUATION.replace_all(&lower, "");
        self.names.contains(stripped.as_ref())
    }
}

impl Default for SensitiveNameFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RedactionFilter for SensitiveNameFilter {
    fn name(&self) -> &str {
        "sensitive_name"
    }

    fn redact(&self, input: ToRedact<'_>) -> Result<Option<Value>> {
        Ok(input
            .field_name
            .filter(|name| self.is_sensitive(name))
            .map(|_| sentinel()))
    }
}
