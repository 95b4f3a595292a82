//! Instruction-tagged backends.

use serde_json::{json, Value};

use crate::adapters::{extract_text, AdapterError, BackendFamily, WireAdapter};
use crate::config::GenerationParams;
use crate::model::CanonicalRequest;

const ANSWER: &str = "/outputs/0/text";

#[derive(Debug, Clone, Copy, Default)]
pub struct InstructAdapter;

impl WireAdapter for InstructAdapter {
    fn family(&self) -> BackendFamily {
        BackendFamily::Instruct
    }

    fn encode(&self, request: &CanonicalRequest, params: &GenerationParams) -> Value {
        json!({
            "prompt": format!("<s>[INST] {} [/INST]", request.text()),
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        })
    }

    fn decode(&self, body: &Value) -> Result<String, AdapterError> {
        extract_text(body, BackendFamily::Instruct, ANSWER)
    }
}
