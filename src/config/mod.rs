//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → consumed once by lifecycle::startup
//!
//! Routing rules are separate and hot:
//!     source (remote service or file)
//!     → routing::cache (TTL + continuation token)
//!     → watcher.rs nudges the cache when the file changes
//! ```
//!
//! # Design Decisions
//! - Process config is immutable once loaded; routing rules are the hot part
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::ServiceConfig;
pub use schema::ListenerConfig;
pub use schema::TimeoutConfig;
pub use schema::ConfigSourceConfig;
pub use schema::RoutingDefaults;
pub use schema::BackendsConfig;
pub use schema::BackendConfig;
pub use schema::GenerationParams;
pub use schema::ObservabilityConfig;

pub use loader::{load_config, ConfigError};
pub use watcher::ConfigWatcher;
