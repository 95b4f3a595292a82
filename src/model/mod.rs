//! Canonical request/response model shared by every subsystem.
//!
//! # Data Flow
//! ```text
//! inbound JSON (any accepted shape)
//!     → http::request (normalize)
//!     → CanonicalRequest (validated, immutable)
//!     → routing + resilience
//!     → CanonicalResponse (exactly one per request)
//!     → http::response (outbound contract)
//! ```

use serde::Serialize;
use thiserror::Error;

/// Category used when the caller does not supply one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Label reported as `model_used` when the degraded stage answers.
pub const DEGRADED_LABEL: &str = "DEGRADED_SERVICE";

/// Errors raised while building a canonical request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Request text was absent or blank.
    #[error("Missing question")]
    MissingQuestion,

    /// Request body could not be interpreted at all.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// A validated request. Fields are private so the invariants hold for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    text: String,
    category: String,
}

impl CanonicalRequest {
    /// Build a request, rejecting blank text and defaulting the category.
    pub fn new(text: impl Into<String>, category: Option<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::MissingQuestion);
        }

        let category = category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Ok(Self { text, category })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Failover stage that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Primary,
    Fallback,
    Degraded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Primary => "PRIMARY",
            Stage::Fallback => "FALLBACK",
            Stage::Degraded => "DEGRADED",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single answer produced for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResponse {
    pub answer_text: String,
    pub backend_used: String,
    pub stage: Stage,
}

impl CanonicalResponse {
    /// Label exposed to callers as `model_used`.
    pub fn model_used(&self) -> String {
        match self.stage {
            Stage::Primary => self.backend_used.clone(),
            Stage::Fallback => format!("FALLBACK:{}", self.backend_used),
            Stage::Degraded => DEGRADED_LABEL.to_string(),
        }
    }
}
