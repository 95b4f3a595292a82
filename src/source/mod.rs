//! Configuration source subsystem.
//!
//! # Data Flow
//! ```text
//! routing::cache (holds continuation token)
//!     → start_session() on first use
//!     → poll(token) → PollOutcome { next_token, content? }
//!         content = None  → "no change", only the token advances
//!         content = Some  → full routing document (JSON)
//! ```
//!
//! # Implementations
//! - http.rs: remote configuration service (session + token polling)
//! - file.rs: local JSON document, token is a content fingerprint

pub mod file;
pub mod http;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use file::FileConfigSource;
pub use http::HttpConfigSource;

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Token to present on the next poll.
    pub next_token: String,
    /// New document, or `None` when nothing changed.
    pub content: Option<Vec<u8>>,
}

/// Errors raised while fetching routing configuration.
///
/// These never reach callers: the cache logs them and serves the last good
/// snapshot.
#[derive(Debug, Error)]
pub enum ConfigFetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("config service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("session token expired")]
    SessionExpired,

    #[error("response missing {0}")]
    MissingField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl ConfigFetchError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::Status { .. } | Self::Io(_) => "transport",
            Self::SessionExpired => "session_expired",
            Self::MissingField(_) | Self::Parse(_) => "parse",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// A pull-based source of routing documents keyed by a continuation token.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Open a polling session and return its first token.
    async fn start_session(&self) -> Result<String, ConfigFetchError>;

    /// Fetch whatever changed since `token`.
    async fn poll(&self, token: &str) -> Result<PollOutcome, ConfigFetchError>;

    /// Name used in logs.
    fn describe(&self) -> String;
}
