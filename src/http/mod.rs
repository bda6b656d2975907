//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → inspector middleware (scope, rate limit, audit, headers)
//!     → handlers.rs (local /api endpoints)
//!       or upstream forwarding
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use server::{build_router, AppState, HttpServer, ServerError};
