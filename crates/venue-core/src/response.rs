//! Decoding of raw capability responses.
//!
//! Model output is never trusted as a fixed type. Every response is decoded
//! once, at the boundary, into [`ExternalPayload`].

use serde_json::{Map, Value};

/// Envelope keys whose array content is treated as the record list.
const ENVELOPE_KEYS: &[&str] = &["venues", "scores", "results"];

/// A decoded capability response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalPayload {
    /// A single JSON object.
    SingleRecord(Map<String, Value>),
    /// A JSON array (or an object wrapping one under an envelope key).
    RecordList(Vec<Value>),
    /// Anything else.
    Unparseable { raw: String, reason: String },
}

/// The response could not be read as records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed result: {reason}")]
pub struct MalformedResult {
    pub reason: String,
    /// Leading part of the raw response, for logs.
    pub excerpt: String,
}

impl ExternalPayload {
    /// Decode raw response text. Markdown code fences are stripped first.
    pub fn decode(raw: &str) -> Self {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Self::Unparseable {
                raw: raw.to_string(),
                reason: "empty response".to_string(),
            };
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value, raw),
            Err(e) => Self::Unparseable {
                raw: raw.to_string(),
                reason: format!("invalid JSON: {e}"),
            },
        }
    }

    fn from_value(value: Value, raw: &str) -> Self {
        match value {
            Value::Array(items) => Self::RecordList(items),
            Value::Object(mut obj) => {
                let envelope = ENVELOPE_KEYS
                    .iter()
                    .find(|k| obj.len() <= 2 && matches!(obj.get(**k), Some(Value::Array(_))));
                match envelope.and_then(|k| obj.remove(*k)) {
                    Some(Value::Array(items)) => Self::RecordList(items),
                    _ => Self::SingleRecord(obj),
                }
            }
            other => Self::Unparseable {
                raw: raw.to_string(),
                reason: format!("expected an object or array, got {other}"),
            },
        }
    }

    /// Normalize to a list of records: a single object becomes a
    /// one-element list.
    pub fn into_records(self) -> Result<Vec<Value>, MalformedResult> {
        match self {
            Self::SingleRecord(obj) => Ok(vec![Value::Object(obj)]),
            Self::RecordList(items) => Ok(items),
            Self::Unparseable { raw, reason } => Err(MalformedResult {
                reason,
                excerpt: excerpt(&raw, 120),
            }),
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SingleRecord(_) => "single_record",
            Self::RecordList(_) => "record_list",
            Self::Unparseable { .. } => "unparseable",
        }
    }
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn excerpt(raw: &str, max_chars: usize) -> String {
    let mut out: String = raw.chars().take(max_chars).collect();
    if raw.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_object_wraps_into_list() {
        let payload = ExternalPayload::decode(r#"{"name": "Loft"}"#);
        assert_eq!(payload.kind(), "single_record");
        let records = payload.into_records().unwrap();
        assert_eq!(records, vec![json!({"name": "Loft"})]);
    }

    #[test]
    fn test_array_used_as_is() {
        let records = ExternalPayload::decode(r#"[{"name": "A"}, {"name": "B"}]"#)
            .into_records()
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let payload = ExternalPayload::decode(r#"{"venues": [{"name": "A"}]}"#);
        assert_eq!(payload.kind(), "record_list");
    }

    #[test]
    fn test_object_with_many_fields_is_not_an_envelope() {
        let payload = ExternalPayload::decode(
            r#"{"name": "A", "type": "bar", "address": "x", "results": []}"#,
        );
        assert_eq!(payload.kind(), "single_record");
    }

    #[test]
    fn test_fenced_json_is_decoded() {
        let raw = "```json\n[{\"name\": \"A\"}]\n```";
        assert_eq!(ExternalPayload::decode(raw).kind(), "record_list");
    }

    #[test]
    fn test_prose_is_unparseable() {
        let err = ExternalPayload::decode("I found three venues near you!")
            .into_records()
            .unwrap_err();
        assert!(err.reason.contains("invalid JSON"));
        assert!(err.excerpt.starts_with("I found"));
    }

    #[test]
    fn test_scalar_json_is_unparseable() {
        assert_eq!(ExternalPayload::decode("42").kind(), "unparseable");
        assert_eq!(ExternalPayload::decode("   ").kind(), "unparseable");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}```"), "{\"a\":1}");
    }
}
