//! Inbound request normalization.
//!
//! # Responsibilities
//! - Accept every inbound shape callers use today
//! - Reduce it to one `CanonicalRequest` before anything else runs
//!
//! # Accepted Shapes
//! ```text
//! {"question": "...", "type": "..."}
//! {"prompt": "...", "type": "..."}
//! {"body": "<json string>"}   or   {"body": {...}}
//! {"Payload": {...}}          or   {"Payload": "<json string>"}
//! ```
//!
//! # Design Decisions
//! - Envelopes unwrap at most a few levels; no recursion on untrusted input
//! - The first of `question`, `prompt` holding non-blank text is used

use serde_json::Value;

use crate::model::{CanonicalRequest, ValidationError};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

const ENVELOPE_KEYS: [&str; 2] = ["Payload", "body"];
const MAX_ENVELOPE_DEPTH: usize = 4;

/// Parse raw request bytes into a canonical request.
pub fn parse_request(bytes: &[u8]) -> Result<CanonicalRequest, ValidationError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ValidationError::InvalidBody(e.to_string()))?;
    normalize(value)
}

/// Reduce any accepted shape to a canonical request.
pub fn normalize(value: Value) -> Result<CanonicalRequest, ValidationError> {
    let mut current = value;

    for _ in 0..MAX_ENVELOPE_DEPTH {
        match unwrap_envelope(&current)? {
            Some(inner) => current = inner,
            None => break,
        }
    }

    let object = current
        .as_object()
        .ok_or_else(|| ValidationError::InvalidBody("expected a JSON object".into()))?;

    let text = ["question", "prompt"]
        .iter()
        .find_map(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
        })
        .ok_or(ValidationError::MissingQuestion)?;

    let category = object.get("type").and_then(Value::as_str).map(str::to_owned);

    CanonicalRequest::new(text, category)
}

/// The inner document if `value` is an envelope without a question of its own.
fn unwrap_envelope(value: &Value) -> Result<Option<Value>, ValidationError> {
    let Some(object) = value.as_object() else {
        return Ok(None);
    };
    if object.contains_key("question") || object.contains_key("prompt") {
        return Ok(None);
    }

    for key in ENVELOPE_KEYS {
        match object.get(key) {
            Some(Value::String(raw)) => {
                let inner = serde_json::from_str(raw)
                    .map_err(|e| ValidationError::InvalidBody(format!("{key}: {e}")))?;
                return Ok(Some(inner));
            }
            Some(inner @ Value::Object(_)) => return Ok(Some(inner.clone())),
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_shape() {
        let req = normalize(json!({"question": "What is APR?", "type": "finance_deep"})).unwrap();
        assert_eq!(req.text(), "What is APR?");
        assert_eq!(req.category(), "finance_deep");
    }

    #[test]
    fn test_prompt_alias_and_default_category() {
        let req = normalize(json!({"prompt": "hello"})).unwrap();
        assert_eq!(req.text(), "hello");
        assert_eq!(req.category(), "general");
    }

    #[test]
    fn test_gateway_body_string() {
        let req = normalize(json!({"body": "{\"question\":\"q1\",\"type\":\"t\"}"})).unwrap();
        assert_eq!(req.text(), "q1");
        assert_eq!(req.category(), "t");
    }

    #[test]
    fn test_nested_payload_envelope() {
        let req = normalize(json!({"Payload": {"body": {"question": "q2"}}})).unwrap();
        assert_eq!(req.text(), "q2");
    }

    #[test]
    fn test_blank_or_null_question_defers_to_prompt() {
        let req = normalize(json!({"question": "  ", "prompt": "hi"})).unwrap();
        assert_eq!(req.text(), "hi");
        let req = normalize(json!({"question": null, "prompt": "hi"})).unwrap();
        assert_eq!(req.text(), "hi");
        let req = normalize(json!({"question": "q", "prompt": "hi"})).unwrap();
        assert_eq!(req.text(), "q");
        assert_eq!(
            normalize(json!({"question": "  ", "prompt": ""})),
            Err(ValidationError::MissingQuestion)
        );
    }

    #[test]
    fn test_missing_question() {
        assert_eq!(normalize(json!({"type": "x"})), Err(ValidationError::MissingQuestion));
        assert_eq!(normalize(json!({"question": "   "})), Err(ValidationError::MissingQuestion));
        assert_eq!(normalize(json!({"question": 42})), Err(ValidationError::MissingQuestion));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(parse_request(b"{not json"), Err(ValidationError::InvalidBody(_))));
        assert!(matches!(parse_request(b"[1,2]"), Err(ValidationError::InvalidBody(_))));
        assert!(matches!(
            normalize(json!({"body": "{broken"})),
            Err(ValidationError::InvalidBody(_))
        ));
    }
}
