//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → scope.rs (skip API routes and assets, classify the action)
//!     → client_ip.rs (resolve client identity from proxy headers)
//!     → rate_limit.rs (fixed-window per-client counter)
//!     → intrusion.rs (signature match on URL and user agent)
//! Outgoing response:
//!     → headers.rs (security headers on forwarded responses)
//! ```
//!
//! # Design Decisions
//! - Only rate limiting blocks; intrusion hits are recorded, not rejected
//! - Client identity trusts proxy headers (no trusted-proxy list)

pub mod client_ip;
pub mod headers;
pub mod intrusion;
pub mod rate_limit;
pub mod scope;

pub use client_ip::resolve_client_ip;
pub use headers::apply_security_headers;
pub use intrusion::IntrusionDetector;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use scope::{is_inspected, RequestAction};
