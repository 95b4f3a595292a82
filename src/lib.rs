//! Failover-aware model router library.

pub mod adapters;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod service;
pub mod source;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::ModelService;
