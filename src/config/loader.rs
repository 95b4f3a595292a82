//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variables naming the configuration source.
pub const ENV_SOURCE_ENDPOINT: &str = "CONFIG_SOURCE_ENDPOINT";
pub const ENV_SOURCE_APP_ID: &str = "CONFIG_SOURCE_APP_ID";
pub const ENV_SOURCE_ENV_ID: &str = "CONFIG_SOURCE_ENV_ID";
pub const ENV_SOURCE_PROFILE_ID: &str = "CONFIG_SOURCE_PROFILE_ID";
pub const ENV_SOURCE_FILE: &str = "CONFIG_SOURCE_FILE";
pub const ENV_BIND_ADDRESS: &str = "MODEL_ROUTER_BIND";

/// Load, apply environment overrides and validate configuration.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto the file configuration.
///
/// Empty values are ignored so an exported-but-blank variable does not
/// clobber the file.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let source = &mut config.config_source;
    if let Some(v) = get(ENV_SOURCE_ENDPOINT) {
        source.endpoint = Some(v);
    }
    if let Some(v) = get(ENV_SOURCE_APP_ID) {
        source.application_id = Some(v);
    }
    if let Some(v) = get(ENV_SOURCE_ENV_ID) {
        source.environment_id = Some(v);
    }
    if let Some(v) = get(ENV_SOURCE_PROFILE_ID) {
        source.profile_id = Some(v);
    }
    if let Some(v) = get(ENV_SOURCE_FILE) {
        source.file_path = Some(v);
    }
    if let Some(v) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = v;
    }
}
