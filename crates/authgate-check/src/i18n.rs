// crates/authgate-check/src/i18n.rs
// ============================================================================
// Module: Message Catalog
// Description: Message catalog and placeholder substitution for console output.
// Purpose: Centralize user-facing strings so report lines stay consistent.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every line the runner writes to the console is stored in a small catalog
//! and rendered through the [`t!`](crate::t) macro. The report line formats
//! are consumed by people and by log scrapers, so they live in one place.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Substituted values are never reinterpreted as placeholders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `status`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"status"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Invalid configuration: {error}"),
    ("credentials.load_failed", "Invalid credential directory: {error}"),
    ("tls.ca_load_failed", "Failed to load CA certificate: {error}"),
    ("suite.start", "{test}: starting test: {url}"),
    ("suite.post_credentials", "{test}: posting credentials"),
    ("suite.cookie_start", "{test}: test with cookie"),
    ("suite.passed", "{test}: passed: {status}"),
    ("suite.passed_body", "{test}: passed: {status} {body}"),
    ("suite.failed", "{test}: failed: {status}"),
    ("suite.failed_history", "{test}: failed: {status} [{history}]"),
    ("suite.failed_error", "{test}: failed: error: {error}"),
    ("suite.user.start", "{test}: {user}: starting test: {url}"),
    ("suite.user.passed", "{test}: {user}: passed: {status}"),
    ("suite.user.passed_body", "{test}: {user}: passed: {status} {body}"),
    ("suite.user.failed", "{test}: {user}: failed: {status}"),
    ("suite.user.failed_error", "{test}: {user}: failed: error: {error}"),
    ("suite.summary", "summary: {passed} passed, {failed} failed"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

/// Returns the raw catalog entries in declaration order.
#[cfg(test)]
pub(crate) const fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG_EN
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` from the catalog while substituting `args`.
///
/// The template is scanned once; substituted values are copied verbatim and
/// never rescanned, so a value containing `{status}` stays literal.
/// Placeholders without a matching argument are kept as written.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let (literal, placeholder) = rest.split_at(open);
        result.push_str(literal);
        let Some(close) = placeholder.find('}') else {
            rest = placeholder;
            break;
        };
        let name = &placeholder[1 .. close];
        match args.iter().find(|arg| arg.key == name) {
            Some(arg) => result.push_str(&arg.value),
            None => result.push_str(&placeholder[..= close]),
        }
        rest = &placeholder[close + 1 ..];
    }
    result.push_str(rest);
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
