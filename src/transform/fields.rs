//! Field extraction helpers shared by the vendor mappings

use crate::transform::{TransformError, TransformResult};
use serde_json::Value;

fn malformed(field: &'static str, reason: impl Into<String>) -> TransformError {
    TransformError::MalformedRecord {
        field,
        reason: reason.into(),
    }
}

/// Reads a required, non-empty string field
pub fn required_str(raw: &Value, field: &'static str) -> TransformResult<String> {
    match raw.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(malformed(field, "is empty")),
        Some(Value::Null) | None => Err(malformed(field, "is missing")),
        Some(other) => Err(malformed(field, format!("is not a string: {}", other))),
    }
}

/// Reads an optional string field, treating blanks as absent
pub fn optional_str(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads a required numeric field
pub fn required_number(raw: &Value, field: &'static str) -> TransformResult<f64> {
    match raw.get(field) {
        Some(Value::Null) | None => Err(malformed(field, "is missing")),
        Some(value) => coerce_number(value, field),
    }
}

/// Coerces a JSON number or numeric string (`"$31,500"`) into a finite `f64`
pub fn coerce_number(value: &Value, field: &'static str) -> TransformResult<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != '$' && *c != ',')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(malformed(field, format!("is not numeric: {}", value))),
    }
}
