// # HTTP IP Source
//
// This crate provides the IP-echo source for the DDNS updater.
//
// ## Purpose
//
// Asks a public echo service (api.ipify.org by default) for the caller's
// address. The service answers a plain GET with the IPv4 address as the
// response body.
//
// ## Behavior
//
// - One request per call; nothing is cached between cycles
// - Every request is bounded by the configured timeout
// - Any transport error, non-2xx status or unparsable body is an
//   `IpDiscovery` error; the caller aborts the cycle without saving

use cfddns_core::config::UpdaterConfig;
use cfddns_core::traits::IpSource;
use cfddns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// HTTP IP-echo source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo service URL (e.g., "https://api.ipify.org")
    /// - `timeout`: Upper bound for each request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a source for the configured echo service
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        Self::new(config.ip_service_url.clone(), config.http_timeout)
    }

    /// Echo service URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Parse an echo-service body into an IPv4 address
fn parse_body(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => Ok(ip),
        Ok(IpAddr::V6(ip)) => Err(Error::ip_discovery(format!(
            "Expected IPv4, got: {}",
            ip
        ))),
        Err(_) => Err(Error::ip_discovery(format!(
            "Invalid IP address: '{}'",
            text
        ))),
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_discovery(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ip_discovery(format!(
                "{} answered HTTP {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_discovery(format!("Failed to read response: {}", e)))?;

        let ip = parse_body(&body)?;
        tracing::debug!("Echo service {} reported {}", self.url, ip);
        Ok(ip)
    }
}
