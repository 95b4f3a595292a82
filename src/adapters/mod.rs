//! Backend adapter subsystem.
//!
//! # Data Flow
//! ```text
//! CanonicalRequest
//!     → registry.rs (backend id → BackendDescriptor)
//!     → family adapter encode (chat / completion / instruct / text)
//!     → transport.rs (POST JSON to the backend endpoint)
//!     → family adapter decode (extract the single answer string)
//!     → answer text
//! ```
//!
//! # Design Decisions
//! - One adapter per payload family, selected by registry lookup
//! - Encode is pure: no I/O, no clock, same input gives same payload
//! - Decode failures (`MalformedResponse`) are a different type from
//!   backend-reported failures (`TransportError`)
//! - Registry is frozen at startup and shared without locks

pub mod chat;
pub mod completion;
pub mod instruct;
pub mod registry;
pub mod text;
pub mod transport;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::GenerationParams;
use crate::model::CanonicalRequest;

pub use registry::AdapterRegistry;
pub use transport::{BackendTransport, HttpTransport, TransportError};

/// Errors raised by the registry and by response decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// No descriptor registered for the id.
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    /// The backend answered but the expected field was absent.
    #[error("malformed {family} response: missing '{field}'")]
    MalformedResponse {
        family: BackendFamily,
        field: &'static str,
    },
}

/// Payload family shared by a group of backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// Messages-style chat API.
    Chat,
    /// Raw prompt completion.
    Completion,
    /// Instruction-tagged prompt.
    Instruct,
    /// Plain text generation, also the catch-all.
    Text,
}

impl BackendFamily {
    /// Parse a family name from configuration.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "completion" => Some(Self::Completion),
            "instruct" | "instruction" => Some(Self::Instruct),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Infer the family from a backend id.
    pub fn infer(backend_id: &str) -> Self {
        let id = backend_id.to_ascii_lowercase();
        if id.contains("claude") || id.contains("anthropic") {
            Self::Chat
        } else if id.contains("llama") {
            Self::Completion
        } else if id.contains("mistral") {
            Self::Instruct
        } else {
            Self::Text
        }
    }

    /// The adapter implementing this family's wire shape.
    pub fn adapter(self) -> &'static dyn WireAdapter {
        match self {
            Self::Chat => &chat::ChatAdapter,
            Self::Completion => &completion::CompletionAdapter,
            Self::Instruct => &instruct::InstructAdapter,
            Self::Text => &text::TextAdapter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Completion => "completion",
            Self::Instruct => "instruct",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode/decode capability of one payload family.
pub trait WireAdapter: Send + Sync + std::fmt::Debug {
    fn family(&self) -> BackendFamily;

    /// Build the backend payload for a request.
    fn encode(&self, request: &CanonicalRequest, params: &GenerationParams) -> Value;

    /// Extract the answer text from a backend response.
    fn decode(&self, body: &Value) -> Result<String, AdapterError>;
}

/// Read a string at a JSON pointer or report which field was missing.
pub(crate) fn extract_text(
    body: &Value,
    family: BackendFamily,
    pointer: &'static str,
) -> Result<String, AdapterError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(AdapterError::MalformedResponse {
            family,
            field: pointer,
        })
}

/// A registered backend.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub id: String,
    pub family: BackendFamily,
    pub endpoint: Url,
    params: GenerationParams,
}

impl BackendDescriptor {
    pub fn new(id: impl Into<String>, family: BackendFamily, endpoint: Url, params: GenerationParams) -> Self {
        Self {
            id: id.into(),
            family,
            endpoint,
            params,
        }
    }

    pub fn encode(&self, request: &CanonicalRequest) -> Value {
        self.family.adapter().encode(request, &self.params)
    }

    pub fn decode(&self, body: &Value) -> Result<String, AdapterError> {
        self.family.adapter().decode(body)
    }
}
