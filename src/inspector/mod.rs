//! Per-request inspection pipeline.
//!
//! # Data Flow
//! ```text
//! request (method, uri, headers)
//!     → resolve client identity
//!     → rate limit check            (decided at arrival)
//!     → intrusion signature check
//!     → country lookup              (bounded, best-effort)
//!     → classify action, build audit line, append to ring buffer
//!     → Inspection { status, rate_limited, ... }
//! ```
//!
//! The inspector is built once at startup and shared behind an `Arc`; all of
//! its state (rate limit windows, audit buffer) lives inside it rather than
//! in globals.

pub mod middleware;

use axum::http::{header, HeaderMap, Method, Uri};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::audit::{AuditLine, AuditLog, ThreatStatus};
use crate::config::InspectorConfig;
use crate::geo::{GeoError, GeoResolver};
use crate::observability::metrics;
use crate::security::{resolve_client_ip, IntrusionDetector, RateLimiter, RequestAction};

pub use middleware::inspection_middleware;

/// Result of inspecting one request.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub client_ip: String,
    pub country: String,
    pub action: RequestAction,
    pub status: ThreatStatus,
    pub rate_limited: bool,
    /// First intrusion signature that matched, if any.
    pub signature: Option<&'static str>,
    /// The rendered audit line.
    pub audit_line: String,
}

pub struct RequestInspector {
    rate_limiter: Arc<RateLimiter>,
    detector: IntrusionDetector,
    audit: Arc<AuditLog>,
    geo: GeoResolver,
    framework_prefix: String,
    retry_after: Duration,
}

impl RequestInspector {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        detector: IntrusionDetector,
        audit: Arc<AuditLog>,
        geo: GeoResolver,
    ) -> Self {
        Self {
            rate_limiter,
            detector,
            audit,
            geo,
            framework_prefix: "/_next".to_string(),
            retry_after: Duration::from_secs(60),
        }
    }

    /// Build an inspector and its collaborators from configuration.
    pub fn from_config(config: &InspectorConfig) -> Result<Self, GeoError> {
        let geo = GeoResolver::from_config(&config.geolocation)?;
        Ok(Self::new(
            Arc::new(RateLimiter::new(&config.rate_limit)),
            IntrusionDetector::new(),
            Arc::new(AuditLog::new(config.audit.capacity)),
            geo,
        )
        .with_framework_prefix(config.inspection.framework_prefix.clone())
        .with_retry_after(Duration::from_secs(config.rate_limit.retry_after_secs)))
    }

    pub fn with_framework_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.framework_prefix = prefix.into();
        self
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    pub fn retry_after(&self) -> Duration {
        self.retry_after
    }

    /// Inspect a request and record it in the audit log.
    pub async fn inspect(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Inspection {
        let client_ip = resolve_client_ip(headers);
        let rate = self.rate_limiter.check(&client_ip);

        let user_agent = header_str(headers, header::USER_AGENT);
        let signature = self.detector.detect(&uri.to_string(), user_agent);

        let country = self.geo.country_for(&client_ip).await;
        let action = RequestAction::classify(method, uri.path(), &self.framework_prefix);
        let status = ThreatStatus::from_signals(rate.limited, signature.is_some());

        let line = AuditLine {
            timestamp: Utc::now(),
            client_ip: client_ip.clone(),
            country: country.clone(),
            action: action.clone(),
            status,
        };
        let audit_line = line.to_string();
        self.audit.append(audit_line.clone());

        metrics::record_inspection(status.as_str());
        if let Some(signature) = signature {
            metrics::record_intrusion(signature);
            tracing::warn!(
                client_ip = %client_ip,
                signature,
                path = %uri.path(),
                "Intrusion signature matched"
            );
        }
        if rate.limited {
            metrics::record_rate_limited();
            tracing::warn!(client_ip = %client_ip, count = rate.count, "Rate limit exceeded");
        }
        tracing::debug!(
            client_ip = %client_ip,
            country = %country,
            referer = header_str(headers, header::REFERER),
            status = %status,
            "Request inspected"
        );

        Inspection {
            client_ip,
            country,
            action,
            status,
            rate_limited: rate.limited,
            signature,
            audit_line,
        }
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use axum::http::HeaderValue;

    fn inspector(max_requests: u32) -> RequestInspector {
        RequestInspector::new(
            Arc::new(RateLimiter::new(&RateLimitConfig {
                max_requests,
                ..RateLimitConfig::default()
            })),
            IntrusionDetector::new(),
            Arc::new(AuditLog::new(100)),
            GeoResolver::disabled(),
        )
    }

    fn from_ip(ip: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(ip));
        headers
    }

    #[tokio::test]
    async fn test_normal_page_access() {
        let inspector = inspector(20);
        let uri: Uri = "/dashboard".parse().unwrap();
        let inspection = inspector.inspect(&Method::GET, &uri, &from_ip("192.168.0.4")).await;

        assert_eq!(inspection.status, ThreatStatus::Normal);
        assert!(!inspection.rate_limited);
        assert_eq!(inspection.country, "Local Network");
        assert!(inspection.audit_line.ends_with(
            "[LIVE_REAL_TIME] IP:192.168.0.4 | COUNTRY:Local Network | ACTION:PAGE_ACCESS: /dashboard | STATUS:NORMAL"
        ));
        assert_eq!(inspector.audit().snapshot().logs, vec![inspection.audit_line]);
    }

    #[tokio::test]
    async fn test_intrusion_is_recorded() {
        let inspector = inspector(20);
        let uri: Uri = "/search?q=%3Cscript%3Ealert(1)%3C/script%3E".parse().unwrap();
        let inspection = inspector.inspect(&Method::GET, &uri, &from_ip("8.8.8.8")).await;

        assert_eq!(inspection.status, ThreatStatus::IntrusionAttempt);
        assert_eq!(inspection.signature, Some("script_tag"));
        assert_eq!(inspection.country, "Unknown");
        assert!(!inspection.rate_limited);
    }

    #[tokio::test]
    async fn test_rate_limit_outranks_intrusion() {
        let inspector = inspector(1);
        let uri: Uri = "/search?q=%3Cscript%3E".parse().unwrap();
        let headers = from_ip("7.7.7.7");

        let first = inspector.inspect(&Method::GET, &uri, &headers).await;
        assert_eq!(first.status, ThreatStatus::IntrusionAttempt);

        let second = inspector.inspect(&Method::GET, &uri, &headers).await;
        assert!(second.rate_limited);
        assert_eq!(second.status, ThreatStatus::DdosThreat);
        assert!(second.audit_line.ends_with("STATUS:DDOS_THREAT"));
    }

    #[tokio::test]
    async fn test_user_agent_signature() {
        let inspector = inspector(20);
        let mut headers = from_ip("8.8.8.8");
        headers.insert(header::USER_AGENT, HeaderValue::from_static("<SCRIPT>evil"));
        let uri: Uri = "/".parse().unwrap();
        let inspection = inspector.inspect(&Method::GET, &uri, &headers).await;

        assert_eq!(inspection.status, ThreatStatus::IntrusionAttempt);
        assert_eq!(inspection.action.to_string(), "GET /");
    }

    #[test]
    fn test_from_config_applies_settings() {
        let mut config = InspectorConfig::default();
        config.geolocation.enabled = false;
        config.rate_limit.retry_after_secs = 120;
        let inspector = RequestInspector::from_config(&config).unwrap();
        assert_eq!(inspector.retry_after(), Duration::from_secs(120));
        assert_eq!(inspector.audit().capacity(), 100);
    }
}
