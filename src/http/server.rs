//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with local API handlers
//! - Wire up middleware (request ID, tracing, timeout, inspection)
//! - Forward everything else to the upstream application
//! - Run the rate limit sweeper alongside the server

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::InspectorConfig;
use crate::geo::GeoError;
use crate::http::handlers;
use crate::inspector::{inspection_middleware, RequestInspector};
use crate::observability::metrics;
use crate::reports::{MemoryReportStore, ReportStore};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream address '{0}'")]
    InvalidUpstream(String),
    #[error("failed to build geolocation client: {0}")]
    Geo(#[from] GeoError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inspector: Arc<RequestInspector>,
    pub reports: Arc<dyn ReportStore>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    pub upstream_timeout: Duration,
}

impl AppState {
    pub fn new(
        config: &InspectorConfig,
        inspector: Arc<RequestInspector>,
        reports: Arc<dyn ReportStore>,
    ) -> Result<Self, ServerError> {
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::InvalidUpstream(config.upstream.address.clone()))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            inspector,
            reports,
            client,
            upstream,
            upstream_timeout: Duration::from_secs(config.upstream.timeout_secs),
        })
    }
}

/// HTTP server for the edge inspector.
pub struct HttpServer {
    router: Router,
    config: InspectorConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server with collaborators built from configuration.
    pub fn new(config: InspectorConfig) -> Result<Self, ServerError> {
        let inspector = Arc::new(RequestInspector::from_config(&config)?);
        let reports: Arc<dyn ReportStore> = Arc::new(MemoryReportStore::new(config.reports.max_reports));
        let state = AppState::new(&config, inspector, reports)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built state.
    pub fn with_state(config: InspectorConfig, state: AppState) -> Self {
        let router = build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream,
            "HTTP server starting"
        );

        let sweep_secs = self.config.rate_limit.sweep_interval_secs;
        if self.config.rate_limit.enabled && sweep_secs > 0 {
            let limiter = self.state.inspector.rate_limiter().clone();
            let sweeper_shutdown = shutdown.resubscribe();
            tokio::spawn(limiter.run_sweeper(Duration::from_secs(sweep_secs), sweeper_shutdown));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &InspectorConfig, state: AppState) -> Router {
    let inspector = state.inspector.clone();
    Router::new()
        .route("/api/status", get(handlers::get_status))
        .route("/api/live-logs", get(handlers::get_live_logs))
        .route(
            "/api/security-reports",
            get(handlers::list_reports).post(handlers::save_report),
        )
        .fallback(proxy_handler)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .with_state(state)
        .layer(middleware::from_fn_with_state(inspector, inspection_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Forward a request to the upstream application.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    let path = parts.uri.path().to_string();
    let upstream_request = Request::from_parts(parts, body);

    match tokio::time::timeout(state.upstream_timeout, state.client.request(upstream_request)).await {
        Ok(Ok(response)) => {
            metrics::record_upstream(response.status().as_u16(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(path = %path, error = %e, "Upstream error");
            metrics::record_upstream(502, start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
        Err(_) => {
            tracing::error!(path = %path, timeout = ?state.upstream_timeout, "Upstream timed out");
            metrics::record_upstream(504, start);
            (StatusCode::GATEWAY_TIMEOUT, "Upstream timed out").into_response()
        }
    }
}
