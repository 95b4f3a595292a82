//! Request pipeline: route, then run the failover chain.

use std::sync::Arc;
use tokio::time::Instant;

use crate::model::{CanonicalRequest, CanonicalResponse};
use crate::observability::metrics;
use crate::resilience::{ChainError, CircuitBreaker};
use crate::routing::{ConfigCache, Router};

/// Everything a handler needs to answer a request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ModelService {
    router: Router,
    breaker: Arc<CircuitBreaker>,
}

impl ModelService {
    pub fn new(router: Router, breaker: CircuitBreaker) -> Self {
        Self {
            router,
            breaker: Arc::new(breaker),
        }
    }

    /// Answer one request. Only budget exhaustion is reported as an error.
    pub async fn answer(&self, request: &CanonicalRequest) -> Result<CanonicalResponse, ChainError> {
        let started = Instant::now();
        let primary = self.router.route(request.category()).await;

        let response = self.breaker.execute(request, &primary).await?;

        metrics::record_request(response.stage, started);
        tracing::info!(
            category = %request.category(),
            primary = %primary,
            stage = %response.stage,
            model_used = %response.model_used(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request answered"
        );

        Ok(response)
    }

    pub fn cache(&self) -> &Arc<ConfigCache> {
        self.router.cache()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}
