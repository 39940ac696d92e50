//! Decimal extraction from loosely typed JSON.
//!
//! Exchanges disagree on whether prices are JSON strings or numbers, and
//! some return `0`/`""` for "unknown". These helpers accept both shapes.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// String or number to `Decimal`. `null`, empty strings and other shapes
/// yield `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

/// Like [`decimal_from_value`], but treats zero as missing.
pub fn nonzero_decimal(value: &Value) -> Option<Decimal> {
    decimal_from_value(value).filter(|d| !d.is_zero())
}
