//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the inspector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the edge inspector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InspectorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Downstream application that receives forwarded requests.
    pub upstream: UpstreamConfig,

    /// Per-client fixed-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Country lookup for audit lines.
    pub geolocation: GeolocationConfig,

    /// Audit ring buffer settings.
    pub audit: AuditConfig,

    /// Request classification settings.
    pub inspection: InspectionConfig,

    /// Security report storage.
    pub reports: ReportsConfig,

    /// Request size and time limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (downstream application) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Time allowed for the upstream to produce a response, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests allowed per client within one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Value of the `Retry-After` header on rejections.
    pub retry_after_secs: u64,

    /// Interval between sweeps of expired entries (0 disables sweeping).
    pub sweep_interval_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 20,
            window_secs: 10,
            retry_after_secs: 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Geolocation lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Enable outbound lookups. When disabled, public IPs resolve to "Unknown".
    pub enabled: bool,

    /// Base URL of the lookup service.
    pub base_url: String,

    /// Lookup deadline in milliseconds.
    pub timeout_ms: u64,
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://ip-api.com".to_string(),
            timeout_ms: 1500,
        }
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Number of most recent lines retained.
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Request classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Path prefix of the upstream framework's internal routes.
    pub framework_prefix: String,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            framework_prefix: "/_next".to_string(),
        }
    }
}

/// Report store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Maximum number of reports kept in memory.
    pub max_reports: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { max_reports: 1000 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted JSON body for local endpoints, in bytes.
    pub max_body_bytes: usize,

    /// Overall request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
