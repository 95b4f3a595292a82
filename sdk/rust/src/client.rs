use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Header naming the stage that produced the answer.
pub const ANSWER_STAGE_HEADER: &str = "x-answer-stage";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub model_used: String,
    /// Stage reported by the server (`PRIMARY`, `FALLBACK` or `DEGRADED`).
    #[serde(skip)]
    pub stage: Option<String>,
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("router returned status {status}: {message}")]
    Status { status: u16, message: String },
}

pub struct RouterClient {
    client: Client,
    base_url: String,
}

impl RouterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ask a question, optionally tagged with a category.
    pub async fn ask(&self, question: &str, category: Option<&str>) -> Result<AskResponse, SdkError> {
        let req = AskRequest {
            question: question.to_string(),
            category: category.map(str::to_string),
        };
        self.ask_raw(&req).await
    }

    /// Post any JSON document to the ask endpoint.
    pub async fn ask_raw<T: Serialize + ?Sized>(&self, body: &T) -> Result<AskResponse, SdkError> {
        let resp = self
            .client
            .post(format!("{}/ask", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let stage = resp
            .headers()
            .get(ANSWER_STAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let text = resp.text().await?;
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            return Err(SdkError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mut answer: AskResponse = resp.json().await?;
        answer.stage = stage;
        Ok(answer)
    }

    /// Current routing snapshot as reported by the server.
    pub async fn config(&self) -> Result<Value, SdkError> {
        self.get_json("/config").await
    }

    pub async fn health(&self) -> Result<Value, SdkError> {
        self.get_json("/health").await
    }

    async fn get_json(&self, path: &str) -> Result<Value, SdkError> {
        let resp = self.client.get(format!("{}{}", self.base_url, path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SdkError::Status {
                status: status.as_u16(),
                message: resp.text().await?,
            });
        }
        Ok(resp.json().await?)
    }
}
