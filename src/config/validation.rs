//! Configuration validation.
//!
//! Semantic checks run after serde has handled syntax. All problems are
//! collected so an operator sees every mistake in one pass.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::InspectorConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &InspectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.upstream.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "upstream.address",
            format!("'{}' is not a socket address", config.upstream.address),
        ));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::new("rate_limit.window_secs", "must be greater than 0"));
    }

    let base_url = &config.geolocation.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ValidationError::new(
            "geolocation.base_url",
            format!("'{}' must be an http(s) URL", base_url),
        ));
    }
    if config.geolocation.timeout_ms == 0 {
        errors.push(ValidationError::new("geolocation.timeout_ms", "must be greater than 0"));
    }

    if config.audit.capacity == 0 {
        errors.push(ValidationError::new("audit.capacity", "must be greater than 0"));
    }
    if !config.inspection.framework_prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "inspection.framework_prefix",
            "must start with '/'",
        ));
    }
    if config.reports.max_reports == 0 {
        errors.push(ValidationError::new("reports.max_reports", "must be greater than 0"));
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "limits.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}' (expected 'pretty' or 'json')", other),
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
