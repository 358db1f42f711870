//! Generic value tree produced when decoding data documents.
//!
//! A document is reduced to ordered maps, sequences and scalars. Scalars are
//! typed by [`coerce_scalar`] and map keys are cleaned by
//! [`sanitize_identifier`] so they can be used as template variable names.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single typed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Decimal(d) => write!(f, "{d}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// A dynamically typed document tree.
///
/// Maps keep insertion order and never contain the same key twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenericValue {
    Scalar(Scalar),
    Sequence(Vec<GenericValue>),
    Map(IndexMap<String, GenericValue>),
}

impl Default for GenericValue {
    fn default() -> Self {
        GenericValue::Map(IndexMap::new())
    }
}

impl GenericValue {
    /// Returns the entries of a map value.
    pub fn as_map(&self) -> Option<&IndexMap<String, GenericValue>> {
        match self {
            GenericValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for GenericValue {
    fn from(s: &str) -> Self {
        GenericValue::Scalar(Scalar::String(s.to_string()))
    }
}

/// Infers the narrowest type for a raw token.
///
/// Integer is tried first, then decimal, then boolean. Anything else is
/// returned unchanged as a string.
pub fn coerce_scalar(raw: &str) -> Scalar {
    let token = raw.trim();

    if let Ok(i) = token.parse::<i64>() {
        return Scalar::Integer(i);
    }

    if is_decimal_literal(token) {
        if let Ok(d) = token.parse::<f64>() {
            return Scalar::Decimal(d);
        }
    }

    if token.eq_ignore_ascii_case("true") {
        return Scalar::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Scalar::Bool(false);
    }

    Scalar::String(raw.to_string())
}

// Optional sign, digits, at most one dot. Rejects exponents, `inf` and `nan`.
fn is_decimal_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Maps a raw document key to an identifier-like key.
///
/// Every character that is not a letter or digit becomes `_`, surrounding
/// underscores are trimmed and a leading digit is dropped. The steps repeat
/// until the key no longer changes, so sanitizing a sanitized key is a no-op.
///
/// ```
/// use csvplate::value::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("bill-to"), "bill_to");
/// assert_eq!(sanitize_identifier("  spaced out  "), "spaced_out");
/// assert_eq!(sanitize_identifier("1st"), "st");
/// ```
pub fn sanitize_identifier(raw: &str) -> String {
    let mut key: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    loop {
        let trimmed = key.trim_matches('_');
        let next = match trimmed.chars().next() {
            Some(first) if first.is_numeric() => trimmed[first.len_utf8()..].trim().to_string(),
            _ => trimmed.trim().to_string(),
        };
        if next == key {
            return key;
        }
        key = next;
    }
}
