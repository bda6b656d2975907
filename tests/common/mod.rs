//! Shared utilities for integration tests.

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use edge_inspector::audit::AuditLog;
use edge_inspector::config::InspectorConfig;
use edge_inspector::geo::{GeoError, GeoLocator, GeoResolver};
use edge_inspector::http::{build_router, AppState};
use edge_inspector::reports::MemoryReportStore;
use edge_inspector::security::{IntrusionDetector, RateLimiter};
use edge_inspector::RequestInspector;

/// Start a mock upstream that answers every request with
/// `upstream saw <METHOD> <target>`.
pub async fn start_mock_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&buf);
                        let request_line = head.lines().next().unwrap_or_default();
                        let mut parts = request_line.split_whitespace();
                        let body = format!(
                            "upstream saw {} {}",
                            parts.next().unwrap_or("?"),
                            parts.next().unwrap_or("?")
                        );
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Frame-Options: SAMEORIGIN\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Always answers with the same country.
pub struct StaticLocator(pub &'static str);

#[async_trait]
impl GeoLocator for StaticLocator {
    async fn country(&self, _ip: &str) -> Result<String, GeoError> {
        Ok(self.0.to_string())
    }
}

/// Never answers in time.
#[allow(dead_code)]
pub struct StalledLocator;

#[async_trait]
impl GeoLocator for StalledLocator {
    async fn country(&self, _ip: &str) -> Result<String, GeoError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("Too Late".to_string())
    }
}

/// Blows up mid-inspection.
#[allow(dead_code)]
pub struct PanickingLocator;

#[async_trait]
impl GeoLocator for PanickingLocator {
    async fn country(&self, _ip: &str) -> Result<String, GeoError> {
        panic!("geolocation backend exploded");
    }
}

pub fn test_config(upstream: SocketAddr) -> InspectorConfig {
    let mut config = InspectorConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.address = upstream.to_string();
    config.upstream.timeout_secs = 5;
    config.observability.metrics_enabled = false;
    config
}

/// Application state wired with a stub locator instead of the HTTP client.
pub fn test_state(config: &InspectorConfig, locator: Arc<dyn GeoLocator>) -> AppState {
    let inspector = RequestInspector::new(
        Arc::new(RateLimiter::new(&config.rate_limit)),
        IntrusionDetector::new(),
        Arc::new(AuditLog::new(config.audit.capacity)),
        GeoResolver::new(locator, Duration::from_millis(200)),
    );
    AppState::new(
        config,
        Arc::new(inspector),
        Arc::new(MemoryReportStore::new(config.reports.max_reports)),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn test_router(config: &InspectorConfig, locator: Arc<dyn GeoLocator>) -> (Router, AppState) {
    let state = test_state(config, locator);
    (build_router(config, state.clone()), state)
}
