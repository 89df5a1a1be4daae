//! Field readers for loosely-typed model output.
//!
//! Model responses drift between numbers and numeric strings, arrays and
//! comma-separated lists, and empty strings standing in for "absent".
//! These helpers read one field at a time so validation can name the field
//! that failed.

use serde_json::{Map, Value};

use super::error::ValidationError;

/// First present, non-null value among `keys`.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Parse the leading numeric portion of a string such as `"0.4 km"`.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Optional trimmed string; empty strings read as absent. Scalars are
/// stringified.
pub fn opt_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let text = match lookup(obj, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Required non-empty string.
pub fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
    keys: &[&str],
) -> Result<String, ValidationError> {
    match lookup(obj, keys) {
        None => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

/// Required finite number, accepting numeric strings.
pub fn required_number(
    obj: &Map<String, Value>,
    field: &'static str,
    keys: &[&str],
) -> Result<f64, ValidationError> {
    let value = lookup(obj, keys).ok_or(ValidationError::MissingField { field })?;
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::InvalidField {
        field,
        reason: format!("expected a number, got {value}"),
    })
}

/// Optional non-negative integer. Unreadable values are treated as absent.
pub fn opt_u32(obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    let n = match lookup(obj, keys)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_leading_number(s)?,
        _ => return None,
    };
    (n >= 0.0 && n <= u32::MAX as f64).then(|| n.round() as u32)
}

/// List of strings from a JSON array or a comma-separated string.
pub fn string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match lookup(obj, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
