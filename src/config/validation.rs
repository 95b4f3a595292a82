//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (fallback backend is registered)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the stage timeouts fit inside the overall budget
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::adapters::BackendFamily;
use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("stage timeouts ({stages}s) exceed overall budget ({overall}s)")]
    StagesExceedBudget { stages: u64, overall: u64 },

    #[error("request timeout ({request}s) must exceed overall budget ({overall}s)")]
    RequestBelowBudget { request: u64, overall: u64 },

    #[error("duplicate backend id '{0}'")]
    DuplicateBackend(String),

    #[error("backend '{id}' has unknown family '{family}'")]
    UnknownFamily { id: String, family: String },

    #[error("invalid endpoint URL '{0}'")]
    InvalidEndpoint(String),

    #[error("fallback backend '{0}' is not registered")]
    UnregisteredFallback(String),

    #[error("config source ttl must be greater than zero")]
    ZeroTtl,
}

/// Validate the whole configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics",
            value: config.observability.metrics_address.clone(),
        });
    }

    let t = &config.timeouts;
    for (name, value) in [
        ("primary", t.primary_secs),
        ("fallback", t.fallback_secs),
        ("degraded", t.degraded_secs),
        ("overall", t.overall_secs),
        ("request", t.request_secs),
        ("connect", t.connect_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }
    let stages = t
        .primary_secs
        .saturating_add(t.fallback_secs)
        .saturating_add(t.degraded_secs);
    if stages > t.overall_secs {
        errors.push(ValidationError::StagesExceedBudget {
            stages,
            overall: t.overall_secs,
        });
    }
    if t.request_secs <= t.overall_secs {
        errors.push(ValidationError::RequestBelowBudget {
            request: t.request_secs,
            overall: t.overall_secs,
        });
    }

    let mut seen = HashSet::new();
    for backend in &config.backends.models {
        if !seen.insert(backend.id.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.id.clone()));
        }
        if let Some(family) = &backend.family {
            if BackendFamily::parse(family).is_none() {
                errors.push(ValidationError::UnknownFamily {
                    id: backend.id.clone(),
                    family: family.clone(),
                });
            }
        }
        if let Some(endpoint) = &backend.endpoint {
            if Url::parse(endpoint).is_err() {
                errors.push(ValidationError::InvalidEndpoint(endpoint.clone()));
            }
        }
    }
    if Url::parse(&config.backends.invoke_base_url).is_err() {
        errors.push(ValidationError::InvalidEndpoint(config.backends.invoke_base_url.clone()));
    }
    if !seen.contains(config.routing.fallback_backend.as_str()) {
        errors.push(ValidationError::UnregisteredFallback(
            config.routing.fallback_backend.clone(),
        ));
    }

    if config.config_source.ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl);
    }
    if let Some(endpoint) = &config.config_source.endpoint {
        if Url::parse(endpoint).is_err() {
            errors.push(ValidationError::InvalidEndpoint(endpoint.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
