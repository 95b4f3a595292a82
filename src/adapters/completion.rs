//! Completion-style backends (raw prompt in, `generation` out).

use serde_json::{json, Value};

use crate::adapters::{extract_text, AdapterError, BackendFamily, WireAdapter};
use crate::config::GenerationParams;
use crate::model::CanonicalRequest;

const ANSWER: &str = "/generation";

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionAdapter;

impl WireAdapter for CompletionAdapter {
    fn family(&self) -> BackendFamily {
        BackendFamily::Completion
    }

    fn encode(&self, request: &CanonicalRequest, params: &GenerationParams) -> Value {
        json!({
            "prompt": request.text(),
            "max_gen_len": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
        })
    }

    fn decode(&self, body: &Value) -> Result<String, AdapterError> {
        extract_text(body, BackendFamily::Completion, ANSWER)
    }
}
