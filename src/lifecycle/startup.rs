//! Startup orchestration.
//!
//! Builds the service graph from a validated [`ServiceConfig`]. The routing
//! source is chosen in order: local file, remote configuration service,
//! static default.

use notify::RecommendedWatcher;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::adapters::registry::RegistryError;
use crate::adapters::{AdapterRegistry, HttpTransport, TransportError};
use crate::config::{ConfigSourceConfig, ConfigWatcher, ServiceConfig, TimeoutConfig};
use crate::resilience::{CircuitBreaker, StageTimeouts};
use crate::routing::{ConfigCache, Router};
use crate::service::ModelService;
use crate::source::{ConfigSource, FileConfigSource, HttpConfigSource};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build backend transport: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to build config source client: {0}")]
    SourceClient(#[source] reqwest::Error),

    #[error("invalid config source endpoint '{value}': {source}")]
    SourceEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// The running service plus the handles that must outlive it.
pub struct Runtime {
    pub service: ModelService,
    /// Dropping the watcher stops hot reload.
    pub watcher: Option<RecommendedWatcher>,
}

/// Assemble registry, transport, cache, router and breaker.
pub fn build_service(config: &ServiceConfig) -> Result<Runtime, StartupError> {
    let registry = Arc::new(AdapterRegistry::from_config(&config.backends, &config.generation)?);
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(config.timeouts.connect_secs))?);

    let cache = Arc::new(build_cache(config)?);
    // A missing document or directory is an unreachable source, not a startup failure.
    let watcher = config.config_source.file_path.as_deref().and_then(|path| {
        ConfigWatcher::new(Path::new(path), cache.clone())
            .run()
            .inspect_err(|e| {
                tracing::warn!(path = %path, error = %e, "Hot reload disabled, routing document cannot be watched");
            })
            .ok()
    });

    let breaker = CircuitBreaker::new(
        registry.clone(),
        transport,
        config.routing.fallback_backend.clone(),
        StageTimeouts::from(&config.timeouts),
    );

    tracing::info!(
        backends = registry.len(),
        fallback = %config.routing.fallback_backend,
        static_routing = cache.is_static(),
        "Service assembled"
    );

    Ok(Runtime {
        service: ModelService::new(Router::new(cache), breaker),
        watcher,
    })
}

fn build_cache(config: &ServiceConfig) -> Result<ConfigCache, StartupError> {
    let static_default = config.routing.static_default_backend.as_str();
    let source_config = &config.config_source;

    let Some(source) = build_source(source_config, &config.timeouts)? else {
        tracing::warn!(
            default = %static_default,
            "No configuration source configured, routing everything to the static default"
        );
        return Ok(ConfigCache::static_only(static_default));
    };

    tracing::info!(source = %source.describe(), ttl_secs = source_config.ttl_secs, "Configuration source selected");
    Ok(ConfigCache::new(
        source,
        Duration::from_secs(source_config.ttl_secs),
        Duration::from_secs(source_config.fetch_timeout_secs),
        static_default,
    ))
}

fn build_source(
    source_config: &ConfigSourceConfig,
    timeouts: &TimeoutConfig,
) -> Result<Option<Arc<dyn ConfigSource>>, StartupError> {
    if let Some(path) = source_config.file_path.as_deref() {
        return Ok(Some(Arc::new(FileConfigSource::new(path))));
    }

    let Some((endpoint, app, env, profile)) = source_config.remote_identifiers() else {
        return Ok(None);
    };

    let endpoint = Url::parse(endpoint).map_err(|source| StartupError::SourceEndpoint {
        value: endpoint.to_string(),
        source,
    })?;
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(StartupError::SourceClient)?;

    Ok(Some(Arc::new(HttpConfigSource::new(
        client,
        endpoint,
        app,
        env,
        profile,
        source_config.min_poll_interval_secs,
    ))))
}
