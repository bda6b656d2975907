//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → InspectorConfig (validated, immutable)
//!     → consumed once at startup to build the inspector and server
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::{
    AuditConfig, GeolocationConfig, InspectionConfig, InspectorConfig, LimitsConfig,
    ListenerConfig, ObservabilityConfig, RateLimitConfig, ReportsConfig, UpstreamConfig,
};
