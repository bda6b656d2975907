//! Edge request inspection for the security dashboard.
//!
//! Every in-scope request is attributed to a client IP, counted against a
//! fixed-window rate limit, matched against intrusion signatures and recorded
//! in a bounded audit log before being forwarded upstream with security
//! headers, or rejected with 429 when the client is over its limit.

pub mod audit;
pub mod config;
pub mod geo;
pub mod http;
pub mod inspector;
pub mod lifecycle;
pub mod observability;
pub mod reports;
pub mod security;

pub use config::InspectorConfig;
pub use http::HttpServer;
pub use inspector::{Inspection, RequestInspector};
pub use lifecycle::Shutdown;
