//! Backend registry.
//!
//! # Responsibilities
//! - Build one descriptor per configured backend at startup
//! - Resolve backend ids to descriptors
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap
//! - Unknown ids are an explicit error, never a silent default

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::adapters::{AdapterError, BackendDescriptor, BackendFamily};
use crate::config::{BackendsConfig, GenerationParams};

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("backend '{id}' has an invalid endpoint: {source}")]
    InvalidEndpoint {
        id: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend '{id}' has unknown family '{family}'")]
    UnknownFamily { id: String, family: String },
}

/// Read-only map of backend id to descriptor.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    descriptors: HashMap<String, Arc<BackendDescriptor>>,
}

impl AdapterRegistry {
    /// Build the registry from configuration.
    pub fn from_config(config: &BackendsConfig, params: &GenerationParams) -> Result<Self, RegistryError> {
        let base = config.invoke_base_url.trim_end_matches('/');
        let mut descriptors = Vec::with_capacity(config.models.len());

        for backend in &config.models {
            let family = match &backend.family {
                Some(name) => BackendFamily::parse(name).ok_or_else(|| RegistryError::UnknownFamily {
                    id: backend.id.clone(),
                    family: name.clone(),
                })?,
                None => BackendFamily::infer(&backend.id),
            };

            let raw = backend
                .endpoint
                .clone()
                .unwrap_or_else(|| format!("{}/model/{}/invoke", base, backend.id));
            let endpoint = Url::parse(&raw).map_err(|source| RegistryError::InvalidEndpoint {
                id: backend.id.clone(),
                source,
            })?;

            tracing::debug!(backend = %backend.id, family = %family, endpoint = %endpoint, "Registered backend");
            descriptors.push(BackendDescriptor::new(backend.id.clone(), family, endpoint, params.clone()));
        }

        Ok(Self::new(descriptors))
    }

    /// Build a registry from ready-made descriptors.
    pub fn new(descriptors: impl IntoIterator<Item = BackendDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
        }
    }

    /// Look up the descriptor for a backend id.
    pub fn resolve(&self, backend_id: &str) -> Result<Arc<BackendDescriptor>, AdapterError> {
        self.descriptors
            .get(backend_id)
            .cloned()
            .ok_or_else(|| AdapterError::UnknownBackend(backend_id.to_string()))
    }

    /// Registered ids, sorted for stable output.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
