//! Chat-style backends (messages API).

use serde_json::{json, Value};

use crate::adapters::{extract_text, AdapterError, BackendFamily, WireAdapter};
use crate::config::GenerationParams;
use crate::model::CanonicalRequest;

const ANSWER: &str = "/content/0/text";

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatAdapter;

impl WireAdapter for ChatAdapter {
    fn family(&self) -> BackendFamily {
        BackendFamily::Chat
    }

    fn encode(&self, request: &CanonicalRequest, params: &GenerationParams) -> Value {
        json!({
            "anthropic_version": params.anthropic_version,
            "max_tokens": params.max_tokens,
            "messages": [{ "role": "user", "content": request.text() }],
        })
    }

    fn decode(&self, body: &Value) -> Result<String, AdapterError> {
        extract_text(body, BackendFamily::Chat, ANSWER)
    }
}
