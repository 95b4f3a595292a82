//! Plain text-generation backends. Also the family for unrecognized ids.

use serde_json::{json, Value};

use crate::adapters::{extract_text, AdapterError, BackendFamily, WireAdapter};
use crate::config::GenerationParams;
use crate::model::CanonicalRequest;

const ANSWER: &str = "/results/0/outputText";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextAdapter;

impl WireAdapter for TextAdapter {
    fn family(&self) -> BackendFamily {
        BackendFamily::Text
    }

    fn encode(&self, request: &CanonicalRequest, params: &GenerationParams) -> Value {
        json!({
            "inputText": request.text(),
            "textGenerationConfig": {
                "maxTokenCount": params.max_tokens,
                "temperature": params.temperature,
                "topP": params.top_p,
            },
        })
    }

    fn decode(&self, body: &Value) -> Result<String, AdapterError> {
        extract_text(body, BackendFamily::Text, ANSWER)
    }
}
