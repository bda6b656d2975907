//! HTTP geolocation client for ip-api compatible services.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::geo::{GeoError, GeoLocator};

const USER_AGENT: &str = "EdgeInspector-Monitoring/1.0";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    country: Option<String>,
}

/// Looks up `GET {base_url}/json/{ip}?fields=country`.
pub struct IpApiLocator {
    client: Client,
    base_url: Url,
}

impl IpApiLocator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GeoError> {
        let raw = base_url.into();
        let base_url = Url::parse(&raw).map_err(|_| GeoError::InvalidBaseUrl(raw.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(GeoError::InvalidBaseUrl(raw));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// The address is pushed as a single escaped path segment.
    fn lookup_url(&self, ip: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("json").push(ip);
        }
        url
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    async fn country(&self, ip: &str) -> Result<String, GeoError> {
        let response = self
            .client
            .get(self.lookup_url(ip))
            .query(&[("fields", "country")])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(GeoError::Status(response.status().as_u16()));
        }

        let body: LookupResponse = response.json().await?;
        match body.country {
            Some(country) if !country.is_empty() => Ok(country),
            _ => Err(GeoError::MissingCountry),
        }
    }
}
