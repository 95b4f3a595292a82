//! Failover chain for a single request.
//!
//! # States
//! - Attempt(Primary): backend chosen by the router
//! - Attempt(Fallback): the one designated fallback backend
//! - Attempt(Degraded): canned answer, cannot fail
//! - Succeeded / Exhausted: terminal
//!
//! # State Transitions
//! ```text
//! Attempt(Primary)  --ok-->  Succeeded      --any error-->  Attempt(Fallback)
//! Attempt(Fallback) --ok-->  Succeeded      --any error-->  Attempt(Degraded)
//! Attempt(Degraded) --ok-->  Succeeded      --(none)----->  Exhausted
//! ```
//!
//! # Design Decisions
//! - Catch-all per stage: every error has exactly one successor, no retries
//! - Each stage bounded by its own timeout; the chain by an overall budget
//! - No state kept between requests

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout, Instant};

use crate::adapters::{AdapterError, AdapterRegistry, BackendTransport, TransportError};
use crate::model::{CanonicalRequest, CanonicalResponse, Stage};
use crate::observability::metrics;
use crate::resilience::degradation::degraded_response;
use crate::resilience::timeouts::StageTimeouts;

/// Why a stage failed. All variants advance the chain the same way.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("stage timed out after {0:?}")]
    Timeout(Duration),
}

impl StageError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Adapter(AdapterError::UnknownBackend(_)) => "unknown_backend",
            Self::Adapter(AdapterError::MalformedResponse { .. }) => "malformed_response",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Outcomes that reach the caller as failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("failover chain exhausted")]
    Exhausted,

    #[error("request budget of {0:?} exceeded")]
    BudgetExceeded(Duration),
}

/// Position in the chain.
#[derive(Debug)]
pub enum ChainState {
    Attempt(Stage),
    Succeeded(CanonicalResponse),
    Exhausted,
}

impl ChainState {
    /// Transition table for a failed stage.
    pub fn after_failure(stage: Stage) -> Self {
        match stage {
            Stage::Primary => Self::Attempt(Stage::Fallback),
            Stage::Fallback => Self::Attempt(Stage::Degraded),
            Stage::Degraded => Self::Exhausted,
        }
    }
}

/// Runs the Primary → Fallback → Degraded chain.
#[derive(Clone)]
pub struct CircuitBreaker {
    registry: Arc<AdapterRegistry>,
    transport: Arc<dyn BackendTransport>,
    fallback_backend: String,
    timeouts: StageTimeouts,
}

impl CircuitBreaker {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        transport: Arc<dyn BackendTransport>,
        fallback_backend: impl Into<String>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            registry,
            transport,
            fallback_backend: fallback_backend.into(),
            timeouts,
        }
    }

    /// Produce the answer for `request`, starting at `primary_backend`.
    pub async fn execute(
        &self,
        request: &CanonicalRequest,
        primary_backend: &str,
    ) -> Result<CanonicalResponse, ChainError> {
        match timeout(self.timeouts.overall, self.run_chain(request, primary_backend)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(budget = ?self.timeouts.overall, "Request budget exceeded");
                metrics::record_budget_exceeded();
                Err(ChainError::BudgetExceeded(self.timeouts.overall))
            }
        }
    }

    async fn run_chain(
        &self,
        request: &CanonicalRequest,
        primary_backend: &str,
    ) -> Result<CanonicalResponse, ChainError> {
        let mut state = ChainState::Attempt(Stage::Primary);

        loop {
            state = match state {
                ChainState::Attempt(stage) => match self.attempt(stage, request, primary_backend).await {
                    Ok(response) => ChainState::Succeeded(response),
                    Err(e) => {
                        tracing::warn!(stage = %stage, reason = e.reason(), error = %e, "Stage failed");
                        metrics::record_stage_failure(stage, e.reason());
                        ChainState::after_failure(stage)
                    }
                },
                ChainState::Succeeded(response) => return Ok(response),
                ChainState::Exhausted => return Err(ChainError::Exhausted),
            };
        }
    }

    async fn attempt(
        &self,
        stage: Stage,
        request: &CanonicalRequest,
        primary_backend: &str,
    ) -> Result<CanonicalResponse, StageError> {
        let backend_id = match stage {
            Stage::Primary => primary_backend,
            Stage::Fallback => self.fallback_backend.as_str(),
            Stage::Degraded => return Ok(degraded_response()),
        };

        let limit = self.timeouts.for_stage(stage);
        let started = Instant::now();
        let answer = timeout(limit, self.invoke(backend_id, request))
            .await
            .map_err(|_| StageError::Timeout(limit))??;

        tracing::debug!(
            stage = %stage,
            backend = %backend_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage succeeded"
        );

        Ok(CanonicalResponse {
            answer_text: answer,
            backend_used: backend_id.to_string(),
            stage,
        })
    }

    async fn invoke(&self, backend_id: &str, request: &CanonicalRequest) -> Result<String, StageError> {
        let descriptor = self.registry.resolve(backend_id)?;
        let payload = descriptor.encode(request);
        let body: Value = self.transport.invoke(&descriptor, payload).await?;
        Ok(descriptor.decode(&body)?)
    }

    pub fn timeouts(&self) -> &StageTimeouts {
        &self.timeouts
    }

    pub fn fallback_backend(&self) -> &str {
        &self.fallback_backend
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("backends", &self.registry.ids())
            .field("fallback_backend", &self.fallback_backend)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    use crate::adapters::{BackendDescriptor, BackendFamily};
    use crate::config::GenerationParams;
    use crate::resilience::degradation::DEGRADED_ANSWER;

    #[derive(Debug, Clone)]
    enum Behavior {
        Answer(&'static str),
        Fail,
        Hang,
        Malformed,
    }

    #[derive(Default)]
    struct ScriptedTransport {
        behaviors: HashMap<&'static str, Behavior>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn with(mut self, backend: &'static str, behavior: Behavior) -> Self {
            self.behaviors.insert(backend, behavior);
            self
        }
    }

    #[async_trait]
    impl BackendTransport for ScriptedTransport {
        async fn invoke(
            &self,
            backend: &BackendDescriptor,
            _payload: Value,
        ) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviors.get(backend.id.as_str()).cloned().unwrap_or(Behavior::Fail) {
                Behavior::Answer(text) => Ok(json!({ "results": [{ "outputText": text }] })),
                Behavior::Fail => Err(TransportError::Unavailable(backend.id.clone())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(json!({}))
                }
                Behavior::Malformed => Ok(json!({ "unexpected": true })),
            }
        }
    }

    fn registry() -> Arc<AdapterRegistry> {
        let descriptor = |id: &str| {
            BackendDescriptor::new(
                id,
                BackendFamily::Text,
                Url::parse(&format!("http://backends.test/{}", id)).unwrap(),
                GenerationParams::default(),
            )
        };
        Arc::new(AdapterRegistry::new(vec![descriptor("b-default"), descriptor("b-fb")]))
    }

    fn breaker(transport: ScriptedTransport) -> (CircuitBreaker, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let breaker = CircuitBreaker::new(registry(), transport.clone(), "b-fb", StageTimeouts::default());
        (breaker, transport)
    }

    fn request() -> CanonicalRequest {
        CanonicalRequest::new("What is APR?", Some("general".into())).unwrap()
    }

    #[tokio::test]
    async fn test_primary_success() {
        let (breaker, transport) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Answer("primary answer"))
                .with("b-fb", Behavior::Answer("fallback answer")),
        );

        let response = breaker.execute(&request(), "b-default").await.unwrap();
        assert_eq!(response.stage, Stage::Primary);
        assert_eq!(response.backend_used, "b-default");
        assert_eq!(response.answer_text, "primary answer");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback() {
        let (breaker, _) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Fail)
                .with("b-fb", Behavior::Answer("fallback answer")),
        );

        for _ in 0..20 {
            let response = breaker.execute(&request(), "b-default").await.unwrap();
            assert_ne!(response.stage, Stage::Primary);
            assert_eq!(response.stage, Stage::Fallback);
            assert_eq!(response.model_used(), "FALLBACK:b-fb");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_uses_fallback() {
        let (breaker, _) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Hang)
                .with("b-fb", Behavior::Answer("fallback answer")),
        );

        let started = Instant::now();
        let response = breaker.execute(&request(), "b-default").await.unwrap();

        assert_eq!(response.stage, Stage::Fallback);
        assert_eq!(response.answer_text, "fallback answer");
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(started.elapsed() < Duration::from_secs(61));
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_advance() {
        let (breaker, _) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Malformed)
                .with("b-fb", Behavior::Answer("fallback answer")),
        );
        let response = breaker.execute(&request(), "b-default").await.unwrap();
        assert_eq!(response.stage, Stage::Fallback);

        let response = breaker.execute(&request(), "not-registered").await.unwrap();
        assert_eq!(response.stage, Stage::Fallback);
    }

    #[tokio::test]
    async fn test_both_fail_degrades() {
        let (breaker, _) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Fail)
                .with("b-fb", Behavior::Malformed),
        );

        let response = breaker.execute(&request(), "b-default").await.unwrap();
        assert_eq!(response.stage, Stage::Degraded);
        assert_eq!(response.answer_text, DEGRADED_ANSWER);
        assert_eq!(response.model_used(), "DEGRADED_SERVICE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timeout_degrades() {
        let (breaker, _) = breaker(
            ScriptedTransport::default()
                .with("b-default", Behavior::Fail)
                .with("b-fb", Behavior::Hang),
        );

        let started = Instant::now();
        let response = breaker.execute(&request(), "b-default").await.unwrap();
        assert_eq!(response.stage, Stage::Degraded);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exceeded() {
        let transport = Arc::new(ScriptedTransport::default().with("b-default", Behavior::Hang));
        let timeouts = StageTimeouts {
            overall: Duration::from_secs(10),
            ..StageTimeouts::default()
        };
        let breaker = CircuitBreaker::new(registry(), transport, "b-fb", timeouts);

        let err = breaker.execute(&request(), "b-default").await.unwrap_err();
        assert_eq!(err, ChainError::BudgetExceeded(Duration::from_secs(10)));
    }

    #[test]
    fn test_transition_table() {
        assert!(matches!(
            ChainState::after_failure(Stage::Primary),
            ChainState::Attempt(Stage::Fallback)
        ));
        assert!(matches!(
            ChainState::after_failure(Stage::Fallback),
            ChainState::Attempt(Stage::Degraded)
        ));
        assert!(matches!(ChainState::after_failure(Stage::Degraded), ChainState::Exhausted));
    }
}
