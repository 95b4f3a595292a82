//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): answered requests by stage
//! - `router_request_duration_seconds` (histogram): latency by stage
//! - `router_stage_failures_total` (counter): failed stages by stage, reason
//! - `router_config_fetches_total` (counter): config refreshes by outcome
//! - `router_budget_exceeded_total` (counter): requests over the overall budget

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::time::Instant;

use crate::model::Stage;

pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "router_request_duration_seconds";
pub const STAGE_FAILURES_TOTAL: &str = "router_stage_failures_total";
pub const CONFIG_FETCHES_TOTAL: &str = "router_config_fetches_total";
pub const BUDGET_EXCEEDED_TOTAL: &str = "router_budget_exceeded_total";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

pub fn record_request(stage: Stage, started: Instant) {
    counter!(REQUESTS_TOTAL, "stage" => stage.as_str()).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "stage" => stage.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_stage_failure(stage: Stage, reason: &'static str) {
    counter!(STAGE_FAILURES_TOTAL, "stage" => stage.as_str(), "reason" => reason).increment(1);
}

pub fn record_config_fetch(outcome: &'static str) {
    counter!(CONFIG_FETCHES_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_budget_exceeded() {
    counter!(BUDGET_EXCEEDED_TOTAL).increment(1);
}
