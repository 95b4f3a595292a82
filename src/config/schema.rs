//! Configuration schema definitions.
//!
//! This module defines the complete process configuration for the router.
//! All types derive Serde traits for deserialization from config files.
//! Routing rules are NOT part of this schema; they arrive at runtime from
//! the configuration source (see `source` and `routing::cache`).

use serde::{Deserialize, Serialize};

/// Root configuration for the model router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Stage and request timeouts.
    pub timeouts: TimeoutConfig,

    /// Where routing rules are pulled from.
    pub config_source: ConfigSourceConfig,

    /// Static routing fallbacks.
    pub routing: RoutingDefaults,

    /// Backend registry definition.
    pub backends: BackendsConfig,

    /// Generation parameters passed to every adapter.
    pub generation: GenerationParams,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for the failover chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Primary stage timeout in seconds.
    pub primary_secs: u64,

    /// Fallback stage timeout in seconds.
    pub fallback_secs: u64,

    /// Degraded stage budget in seconds.
    pub degraded_secs: u64,

    /// Wall-clock budget for the whole chain in seconds.
    pub overall_secs: u64,

    /// HTTP request timeout; must exceed the overall budget.
    pub request_secs: u64,

    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            primary_secs: 60,
            fallback_secs: 30,
            degraded_secs: 5,
            overall_secs: 120,
            request_secs: 130,
            connect_secs: 5,
        }
    }
}

/// Configuration source settings.
///
/// The HTTP source needs the endpoint and all three identifiers; a file
/// path selects the file source instead. With neither, the cache serves the
/// static default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigSourceConfig {
    /// Base URL of the configuration service.
    pub endpoint: Option<String>,

    pub application_id: Option<String>,

    pub environment_id: Option<String>,

    pub profile_id: Option<String>,

    /// Local JSON document used instead of the remote service.
    pub file_path: Option<String>,

    /// How long a snapshot is served without refetching.
    pub ttl_secs: u64,

    /// Minimum poll interval requested when opening a session.
    pub min_poll_interval_secs: u64,

    /// Deadline for a single fetch.
    pub fetch_timeout_secs: u64,
}

impl Default for ConfigSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            application_id: None,
            environment_id: None,
            profile_id: None,
            file_path: None,
            ttl_secs: 60,
            min_poll_interval_secs: 60,
            fetch_timeout_secs: 5,
        }
    }
}

impl ConfigSourceConfig {
    /// Returns the endpoint and identifiers when all are present.
    pub fn remote_identifiers(&self) -> Option<(&str, &str, &str, &str)> {
        match (&self.endpoint, &self.application_id, &self.environment_id, &self.profile_id) {
            (Some(endpoint), Some(app), Some(env), Some(profile)) => {
                Some((endpoint.as_str(), app.as_str(), env.as_str(), profile.as_str()))
            }
            _ => None,
        }
    }
}

/// Static routing values that do not come from the configuration source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingDefaults {
    /// Backend used when no routing snapshot has ever been fetched.
    pub static_default_backend: String,

    /// Backend tried by the fallback stage.
    pub fallback_backend: String,
}

impl Default for RoutingDefaults {
    fn default() -> Self {
        Self {
            static_default_backend: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            fallback_backend: "amazon.titan-text-express-v1".to_string(),
        }
    }
}

/// Backend registry definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Base URL used for backends without an explicit endpoint.
    pub invoke_base_url: String,

    /// Registered backends.
    pub models: Vec<BackendConfig>,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        let ids = [
            "anthropic.claude-3-sonnet-20240229-v1:0",
            "meta.llama3-8b-instruct-v1:0",
            "mistral.mistral-7b-instruct-v0:2",
            "amazon.titan-text-express-v1",
        ];
        Self {
            invoke_base_url: "http://127.0.0.1:8000".to_string(),
            models: ids
                .iter()
                .map(|id| BackendConfig {
                    id: id.to_string(),
                    family: None,
                    endpoint: None,
                })
                .collect(),
        }
    }
}

/// A single backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend identifier, as referenced by routing rules.
    pub id: String,

    /// Payload family; inferred from the id when omitted.
    #[serde(default)]
    pub family: Option<String>,

    /// Full invocation URL; derived from `invoke_base_url` when omitted.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Generation parameters shared by all payload families.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Version string required by chat-family backends.
    pub anthropic_version: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.5,
            top_p: 0.9,
            anthropic_version: "bedrock-2023-05-31".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
