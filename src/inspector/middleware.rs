//! Axum middleware wrapping the inspection pipeline.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::inspector::RequestInspector;
use crate::observability::metrics;
use crate::security::{apply_security_headers, is_inspected};

/// Body of a rate limit rejection.
#[derive(Debug, Serialize)]
pub struct RateLimitRejection {
    pub error: &'static str,
    pub message: &'static str,
}

/// Inspect in-scope requests, reject rate-limited clients and decorate
/// forwarded responses with security headers.
///
/// A fault inside the pipeline fails open: it is logged and counted, and the
/// request is forwarded as if it had passed.
pub async fn inspection_middleware(
    State(inspector): State<Arc<RequestInspector>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_inspected(request.uri().path()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let outcome = AssertUnwindSafe(inspector.inspect(&parts.method, &parts.uri, &parts.headers))
        .catch_unwind()
        .await;

    match outcome {
        Ok(inspection) if inspection.rate_limited => {
            return rate_limit_response(inspector.retry_after().as_secs());
        }
        Ok(_) => {}
        Err(panic) => {
            metrics::record_inspection_fault();
            tracing::error!(
                path = %parts.uri.path(),
                fault = panic_message(panic.as_ref()),
                "Inspection failed, forwarding request"
            );
        }
    }

    let mut response = next.run(Request::from_parts(parts, body)).await;
    apply_security_headers(response.headers_mut());
    response
}

/// 429 with a JSON body and a `Retry-After` hint.
pub fn rate_limit_response(retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(RateLimitRejection {
            error: "Rate limit exceeded",
            message: "Too many requests. Access temporarily blocked.",
        }),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
