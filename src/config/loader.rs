//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::InspectorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the upstream address.
pub const ENV_UPSTREAM: &str = "EDGE_INSPECTOR_UPSTREAM";
/// Overrides the listener bind address.
pub const ENV_BIND: &str = "EDGE_INSPECTOR_BIND";

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
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InspectorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text, applying environment overrides.
pub fn parse_config(content: &str) -> Result<InspectorConfig, ConfigError> {
    let mut config: InspectorConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the configuration used when no file is given.
pub fn default_config() -> Result<InspectorConfig, ConfigError> {
    parse_config("")
}

fn apply_env_overrides<F>(config: &mut InspectorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(upstream) = lookup(ENV_UPSTREAM) {
        config.upstream.address = upstream;
    }
    if let Some(bind) = lookup(ENV_BIND) {
        config.listener.bind_address = bind;
    }
}
