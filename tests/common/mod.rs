//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use model_router::config::{BackendConfig, ServiceConfig};
use model_router::lifecycle::{build_service, Shutdown};
use model_router::HttpServer;
use router_sdk::RouterClient;

/// How a mock backend answers every call.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Answer(&'static str),
    Status(u16),
    Hang,
    Malformed,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn endpoint(&self) -> String {
        format!("http://{}/invoke", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a text-family backend on an ephemeral port.
pub async fn start_backend(behavior: Behavior) -> MockBackend {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let app = Router::new().route(
        "/invoke",
        post(move |Json(_payload): Json<Value>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                match behavior {
                    Behavior::Answer(text) => {
                        (StatusCode::OK, Json(json!({ "results": [{ "outputText": text }] })))
                    }
                    Behavior::Status(code) => (
                        StatusCode::from_u16(code).unwrap(),
                        Json(json!({ "message": "injected failure" })),
                    ),
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        (StatusCode::OK, Json(json!({})))
                    }
                    Behavior::Malformed => (StatusCode::OK, Json(json!({ "unexpected": true }))),
                }
            }
        }),
    );

    MockBackend {
        addr: serve(app).await,
        calls,
    }
}

/// Programmable state of the mock configuration service.
#[derive(Default)]
pub struct ConfigServiceState {
    pending: Mutex<Option<String>>,
    tokens_seen: Mutex<Vec<String>>,
    issued: AtomicUsize,
    sessions: AtomicUsize,
    pub fail_polls: AtomicBool,
    pub expire_next: AtomicBool,
}

impl ConfigServiceState {
    /// Deliver `document` on the next successful poll.
    pub fn publish(&self, document: Value) {
        *self.pending.lock().unwrap() = Some(document.to_string());
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }

    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

pub struct MockConfigService {
    pub addr: SocketAddr,
    pub state: Arc<ConfigServiceState>,
}

impl MockConfigService {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn start_session(State(state): State<Arc<ConfigServiceState>>, Json(body): Json<Value>) -> Response {
    if body.get("ApplicationIdentifier").and_then(Value::as_str).is_none() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }
    let n = state.sessions.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "InitialConfigurationToken": format!("session-{n}") })).into_response()
}

async fn get_configuration(
    State(state): State<Arc<ConfigServiceState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = params.get("configuration_token").cloned().unwrap_or_default();
    state.tokens_seen.lock().unwrap().push(token);

    if state.expire_next.swap(false, Ordering::SeqCst) {
        return (StatusCode::BAD_REQUEST, "token expired").into_response();
    }
    if state.fail_polls.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let body = state.pending.lock().unwrap().take().unwrap_or_default();
    (
        StatusCode::OK,
        [("next-poll-configuration-token", format!("t{n}"))],
        body,
    )
        .into_response()
}

/// Start an AppConfig-data style configuration service.
pub async fn start_config_service() -> MockConfigService {
    let state = Arc::new(ConfigServiceState::default());
    let app = Router::new()
        .route("/configurationsessions", post(start_session))
        .route("/configuration", get(get_configuration))
        .with_state(state.clone());

    MockConfigService {
        addr: serve(app).await,
        state,
    }
}

pub fn text_backend(id: &str, backend: &MockBackend) -> BackendConfig {
    BackendConfig {
        id: id.into(),
        family: Some("text".into()),
        endpoint: Some(backend.endpoint()),
    }
}

/// `b-default` as primary, `b-fb` as fallback, one-second stage timeouts.
pub fn router_config(primary: &MockBackend, fallback: &MockBackend) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.backends.models = vec![text_backend("b-default", primary), text_backend("b-fb", fallback)];
    config.routing.static_default_backend = "b-default".into();
    config.routing.fallback_backend = "b-fb".into();
    config.timeouts.primary_secs = 1;
    config.timeouts.fallback_secs = 1;
    config.timeouts.degraded_secs = 1;
    config.timeouts.overall_secs = 5;
    config.timeouts.request_secs = 10;
    config.timeouts.connect_secs = 1;
    config
}

pub fn with_remote_source(mut config: ServiceConfig, service: &MockConfigService, ttl_secs: u64) -> ServiceConfig {
    config.config_source.endpoint = Some(service.endpoint());
    config.config_source.application_id = Some("app".into());
    config.config_source.environment_id = Some("env".into());
    config.config_source.profile_id = Some("profile".into());
    config.config_source.ttl_secs = ttl_secs;
    config.config_source.fetch_timeout_secs = 2;
    config
}

pub struct TestRouter {
    pub addr: SocketAddr,
    pub client: RouterClient,
    pub shutdown: Shutdown,
    _watcher: Option<notify::RecommendedWatcher>,
}

impl TestRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRouter {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Build the service from `config` and serve it on an ephemeral port.
pub async fn start_router(config: ServiceConfig) -> TestRouter {
    let runtime = build_service(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, runtime.service);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRouter {
        addr,
        client: RouterClient::new(&format!("http://{}", addr)),
        shutdown,
        _watcher: runtime.watcher,
    }
}
