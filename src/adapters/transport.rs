//! Backend RPC transport.
//!
//! # Responsibilities
//! - Send an encoded payload to a backend endpoint
//! - Return the parsed JSON response body
//! - Report backend-side failures (connect errors, non-2xx) as `TransportError`
//!
//! # Design Decisions
//! - No per-call timeout here: the orchestrator bounds each stage
//! - Trait seam so tests can substitute scripted backends

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::BackendDescriptor;

/// Failure reported by or on the way to a backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Invokes a backend with a JSON payload.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    async fn invoke(&self, backend: &BackendDescriptor, payload: Value) -> Result<Value, TransportError>;
}

/// reqwest-based transport posting JSON to each backend's endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BackendTransport for HttpTransport {
    async fn invoke(&self, backend: &BackendDescriptor, payload: Value) -> Result<Value, TransportError> {
        tracing::debug!(backend = %backend.id, endpoint = %backend.endpoint, "Invoking backend");

        let response = self
            .client
            .post(backend.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
