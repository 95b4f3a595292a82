//! Category → backend lookup.
//!
//! # Design Decisions
//! - Reads one snapshot per call, so a request never mixes two configurations
//! - Absence of an override is the common case, not an error

use std::sync::Arc;
use crate::routing::cache::ConfigCache;

#[derive(Debug, Clone)]
pub struct Router {
    cache: Arc<ConfigCache>,
}

impl Router {
    pub fn new(cache: Arc<ConfigCache>) -> Self {
        Self { cache }
    }

    /// Backend id for a request category. Never fails.
    pub async fn route(&self, category: &str) -> String {
        let config = self.cache.get_config().await;
        let backend = config.backend_for(category).to_string();
        tracing::debug!(category = %category, backend = %backend, "Routed request");
        backend
    }

    pub fn cache(&self) -> &Arc<ConfigCache> {
        &self.cache
    }
}
