//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, request timeout)
//! - Bind server to listener and drain on shutdown
//! - Hand normalized requests to the model service

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, Request},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{parse_request, X_REQUEST_ID};
use crate::http::response::{Answer, ApiError};
use crate::service::ModelService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ModelService,
}

/// HTTP front end of the model router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, service: ModelService) -> Self {
        let state = AppState { service };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/", post(ask_handler))
            .route("/ask", post(ask_handler))
            .route("/health", get(health_handler))
            .route("/config", get(config_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %id,
                        )
                    }))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::new(request_id)),
            )
    }

    /// The configured router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until a shutdown signal arrives, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn ask_handler(State(state): State<AppState>, body: Bytes) -> Result<Answer, ApiError> {
    let request = parse_request(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected request");
    })?;

    let response = state.service.answer(&request).await?;
    Ok(Answer(response))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "static_routing": state.service.cache().is_static(),
    }))
}

/// Routing snapshot currently in effect and how long ago it was confirmed.
async fn config_handler(State(state): State<AppState>) -> Json<Value> {
    let cache = state.service.cache();
    let snapshot = cache.get_config().await;
    let age_secs = cache.current().map(|entry| entry.fetched_at.elapsed().as_secs());

    Json(json!({
        "default_model": snapshot.default_backend,
        "overrides": snapshot.overrides_by_category,
        "age_secs": age_secs,
        "static_routing": cache.is_static(),
    }))
}
