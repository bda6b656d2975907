//! Coarse country lookup for audit lines.
//!
//! Lookups are best-effort: private addresses never leave the process, and
//! every failure (error, timeout, bad body) degrades to [`UNKNOWN_COUNTRY`].

pub mod ip_api;

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeolocationConfig;
use crate::observability::metrics;

pub use ip_api::IpApiLocator;

pub const LOCAL_NETWORK: &str = "Local Network";
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Errors from a geolocation collaborator.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("lookup request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("lookup service returned status {0}")]
    Status(u16),
    #[error("lookup response has no country")]
    MissingCountry,
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid lookup base url '{0}'")]
    InvalidBaseUrl(String),
}

/// A source of country names for public IP addresses.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn country(&self, ip: &str) -> Result<String, GeoError>;
}

/// Loopback and the private ranges the dashboard treats as local.
pub fn is_local_address(ip: &str) -> bool {
    ip == "127.0.0.1" || ip.starts_with("192.168.") || ip.starts_with("10.")
}

/// Applies the local short-circuit and a hard deadline around a locator.
#[derive(Clone)]
pub struct GeoResolver {
    locator: Option<Arc<dyn GeoLocator>>,
    timeout: Duration,
}

impl GeoResolver {
    pub fn new(locator: Arc<dyn GeoLocator>, timeout: Duration) -> Self {
        Self {
            locator: Some(locator),
            timeout,
        }
    }

    /// A resolver that never calls out; public addresses are "Unknown".
    pub fn disabled() -> Self {
        Self {
            locator: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &GeolocationConfig) -> Result<Self, GeoError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        let locator = IpApiLocator::new(config.base_url.clone(), config.timeout())?;
        Ok(Self::new(Arc::new(locator), config.timeout()))
    }

    /// Country label for `ip`. Never fails.
    ///
    /// Only well-formed IP addresses are sent to the locator; anything else a
    /// client put in its forwarding headers is "Unknown".
    pub async fn country_for(&self, ip: &str) -> String {
        if is_local_address(ip) {
            return LOCAL_NETWORK.to_string();
        }
        if ip.parse::<IpAddr>().is_err() {
            tracing::debug!(client_ip = %ip, "Client identifier is not an IP address, skipping lookup");
            return UNKNOWN_COUNTRY.to_string();
        }
        let Some(locator) = &self.locator else {
            return UNKNOWN_COUNTRY.to_string();
        };

        let result = match tokio::time::timeout(self.timeout, locator.country(ip)).await {
            Ok(result) => result,
            Err(_) => Err(GeoError::Timeout(self.timeout)),
        };

        match result {
            Ok(country) => {
                metrics::record_geo_lookup("success");
                country
            }
            Err(e) => {
                metrics::record_geo_lookup("failure");
                tracing::debug!(client_ip = %ip, error = %e, "Geolocation lookup failed");
                UNKNOWN_COUNTRY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLocator {
        calls: AtomicUsize,
        delay: Duration,
        answer: Result<&'static str, ()>,
    }

    impl CountingLocator {
        fn new(answer: Result<&'static str, ()>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
                answer,
            })
        }
    }

    #[async_trait]
    impl GeoLocator for CountingLocator {
        async fn country(&self, _ip: &str) -> Result<String, GeoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.answer
                .map(str::to_string)
                .map_err(|_| GeoError::Status(500))
        }
    }

    #[tokio::test]
    async fn test_local_addresses_skip_lookup() {
        let locator = CountingLocator::new(Ok("Nowhere"), Duration::ZERO);
        let resolver = GeoResolver::new(locator.clone(), Duration::from_secs(1));

        for ip in ["127.0.0.1", "192.168.1.20", "10.0.0.7"] {
            assert_eq!(resolver.country_for(ip).await, LOCAL_NETWORK);
        }
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_public_address_uses_locator() {
        let locator = CountingLocator::new(Ok("Germany"), Duration::ZERO);
        let resolver = GeoResolver::new(locator.clone(), Duration::from_secs(1));
        assert_eq!(resolver.country_for("5.9.0.1").await, "Germany");
        assert_eq!(locator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_identifier_skips_lookup() {
        let locator = CountingLocator::new(Ok("Germany"), Duration::ZERO);
        let resolver = GeoResolver::new(locator.clone(), Duration::from_secs(1));

        for ip in ["8.8.8.8/../x", "8.8.8.8/../../internal/admin#", "unknown", "8.8.8.8:443"] {
            assert_eq!(resolver.country_for(ip).await, UNKNOWN_COUNTRY, "{}", ip);
        }
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);

        assert_eq!(resolver.country_for("2001:4860:4860::8888").await, "Germany");
        assert_eq!(locator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_unknown() {
        let locator = CountingLocator::new(Err(()), Duration::ZERO);
        let resolver = GeoResolver::new(locator, Duration::from_secs(1));
        assert_eq!(resolver.country_for("5.9.0.1").await, UNKNOWN_COUNTRY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_unknown() {
        let locator = CountingLocator::new(Ok("Too Late"), Duration::from_secs(30));
        let resolver = GeoResolver::new(locator, Duration::from_millis(100));
        assert_eq!(resolver.country_for("5.9.0.1").await, UNKNOWN_COUNTRY);
    }

    #[tokio::test]
    async fn test_disabled_resolver() {
        let resolver = GeoResolver::disabled();
        assert_eq!(resolver.country_for("8.8.8.8").await, UNKNOWN_COUNTRY);
        assert_eq!(resolver.country_for("10.1.1.1").await, LOCAL_NETWORK);
    }

    #[test]
    fn test_local_address_prefixes() {
        assert!(is_local_address("192.168.0.1"));
        assert!(!is_local_address("172.16.0.1"));
        assert!(!is_local_address("127.0.0.2"));
        assert!(!is_local_address("100.1.1.1"));
    }
}
