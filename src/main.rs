//! Failover-aware model router (v1)
//!
//! Answers questions by routing them to a model backend chosen per request
//! category, falling back to a second backend and finally to a canned answer.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    MODEL ROUTER                      │
//!                      │                                                      │
//!   Client Request     │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!   ───────────────────┼─▶│  http   │───▶│ service  │───▶│   routing    │◀────┼── Config
//!                      │  │ server  │    │          │    │ cache+router │     │   Source
//!                      │  └─────────┘    └────┬─────┘    └──────────────┘     │
//!                      │                      │                               │
//!                      │                      ▼                               │
//!                      │               ┌──────────────┐   ┌──────────┐        │
//!   Client Response    │               │  resilience  │──▶│ adapters │────────┼──▶ Model
//!   ◀──────────────────┼───────────────│ P → F → D    │◀──│ registry │◀───────┼─── Backends
//!                      │               └──────────────┘   └──────────┘        │
//!                      │                                                      │
//!                      │  Cross-cutting: config, observability, lifecycle     │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use model_router::config::load_config;
use model_router::lifecycle::{build_service, wait_for_signal, Shutdown};
use model_router::observability::{logging, metrics};
use model_router::HttpServer;

#[derive(Parser)]
#[command(name = "model-router")]
#[command(about = "Failover-aware model router", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "MODEL_ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("model-router v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        overall_budget_secs = config.timeouts.overall_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Watcher handle must live as long as the server.
    let runtime = build_service(&config)?;
    let _watcher = runtime.watcher;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, runtime.service);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
