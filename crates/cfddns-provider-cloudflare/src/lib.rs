// # Cloudflare DNS Provider
//
// Cloudflare API v4 client for the DDNS updater.
//
// ## Scope
//
// - The reconciliation cycle uses exactly one call: a PATCH of the managed
//   record's `content`
// - Setup flows use the rest: token verification, zone listing, A-record
//   listing and record creation
// - No retries, no caching, no background tasks: one request per call,
//   and the scheduler's next tick is the retry
//
// ## Security
//
// - The API token is passed per call and never stored in the client
// - The token never appears in logs or error messages
//
// ## Error Mapping
//
// - Envelope with `success: false` (any HTTP status) → `ProviderRejected`
// - Request failure, unreadable body, or a non-2xx answer that is not an
//   envelope → `ProviderTransport`
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - List Zones: GET `/zones`
// - Verify Token: GET `/user/tokens/verify`

pub mod models;

use async_trait::async_trait;
use cfddns_core::config::UpdaterConfig;
use cfddns_core::state::ApiToken;
use cfddns_core::traits::{DnsProvider, RecordTarget, UpdateResult};
use cfddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::net::Ipv4Addr;
use std::time::Duration;

use models::{ApiResponse, ContentPatch, DnsRecord, NewRecord, TokenStatus, Zone};

/// Provider name used in errors and logs
pub const PROVIDER_NAME: &str = "cloudflare";

/// Placeholder content for records created during setup; the first cycle
/// replaces it with the real address
pub const PLACEHOLDER_CONTENT: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

/// Comment attached to records created during setup
pub const RECORD_COMMENT: &str = "Created by cloudflare-ddns-updater";

/// Longest slice of a non-envelope body quoted in an error
const MAX_BODY_SNIPPET: usize = 200;

/// Cloudflare DNS provider
///
/// Holds only the endpoint and an HTTP client; credentials travel with each
/// call, so one client can serve any installation.
#[derive(Debug, Clone)]
pub struct CloudflareProvider {
    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_base`: API base URL (e.g., "https://api.cloudflare.com/client/v4")
    /// - `timeout`: Upper bound for each request
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        Ok(Self { api_base, client })
    }

    /// Create a provider for the configured endpoint and timeout
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        Self::new(config.api_base.clone(), config.http_timeout)
    }

    /// API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Check that `token` is valid and active
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /user/tokens/verify
    /// Authorization: Bearer <token>
    /// ```
    pub async fn verify_token(&self, token: &ApiToken) -> Result<TokenStatus> {
        let request = self.client.get(self.url("/user/tokens/verify"));
        let status: TokenStatus = self.send(request, token, "token verification").await?;

        if !status.is_active() {
            return Err(Error::provider_rejected(
                PROVIDER_NAME,
                format!("token status is '{}'", status.status),
            ));
        }
        Ok(status)
    }

    /// List the zones the token can see
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones
    /// Authorization: Bearer <token>
    /// ```
    pub async fn list_zones(&self, token: &ApiToken) -> Result<Vec<Zone>> {
        let request = self.client.get(self.url("/zones"));
        self.send(request, token, "zone listing").await
    }

    /// List the A records of a zone
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A
    /// Authorization: Bearer <token>
    /// ```
    pub async fn list_a_records(&self, zone_id: &str, token: &ApiToken) -> Result<Vec<DnsRecord>> {
        let request = self
            .client
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&[("type", "A")]);
        let records: Vec<DnsRecord> = self.send(request, token, "record listing").await?;

        // The type filter is a request hint; keep only A records regardless
        Ok(records
            .into_iter()
            .filter(|record| record.record_type == "A")
            .collect())
    }

    /// Create a proxied A record holding the placeholder address
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// Authorization: Bearer <token>
    ///
    /// {
    ///   "name": "dns.example.com",
    ///   "type": "A",
    ///   "content": "8.8.8.8",
    ///   "proxied": true,
    ///   "comment": "Created by cloudflare-ddns-updater"
    /// }
    /// ```
    pub async fn create_record(
        &self,
        zone_id: &str,
        name: &str,
        token: &ApiToken,
    ) -> Result<DnsRecord> {
        let body = NewRecord {
            name,
            record_type: "A",
            content: PLACEHOLDER_CONTENT.to_string(),
            proxied: true,
            comment: RECORD_COMMENT,
        };
        let request = self
            .client
            .post(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .json(&body);

        let record: DnsRecord = self.send(request, token, "record creation").await?;
        tracing::info!("Created DNS record {} ({})", record.name, record.id);
        Ok(record)
    }

    /// Send an authenticated request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        token: &ApiToken,
        action: &str,
    ) -> Result<T> {
        let response = request
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                Error::provider_transport(PROVIDER_NAME, format!("{} request failed: {}", action, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::provider_transport(
                PROVIDER_NAME,
                format!("{}: failed to read response: {}", action, e),
            )
        })?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(Error::provider_transport(
                    PROVIDER_NAME,
                    format!("{}: unexpected response body: {}", action, e),
                ));
            }
            Err(_) => {
                return Err(Error::provider_transport(
                    PROVIDER_NAME,
                    format!("{}: HTTP {}: {}", action, status, snippet(&body)),
                ));
            }
        };

        if !envelope.success {
            return Err(Error::provider_rejected(
                PROVIDER_NAME,
                format!("{} (HTTP {}): {}", action, status, envelope.error_summary()),
            ));
        }

        envelope.result.ok_or_else(|| {
            Error::provider_transport(PROVIDER_NAME, format!("{}: response has no result", action))
        })
    }
}

fn snippet(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_SNIPPET) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Turn operator input into a fully qualified record name inside `zone`
///
/// Spaces are dropped; empty input selects `dns.<zone>`; a name outside the
/// zone keeps its first label and moves into the zone.
pub fn qualify_record_name(input: &str, zone: &str) -> String {
    let name: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if name.is_empty() {
        return format!("dns.{}", zone);
    }
    if name == zone || name.ends_with(&format!(".{}", zone)) {
        return name;
    }
    let label = name.split('.').next().unwrap_or(&name);
    format!("{}.{}", label, zone)
}

/// Find the record called `name` among `records`
pub fn find_record<'a>(records: &'a [DnsRecord], name: &str) -> Option<&'a DnsRecord> {
    records.iter().find(|record| record.name == name)
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Point the managed A record at `ip`
    ///
    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// { "content": "203.0.113.5" }
    /// ```
    async fn update_record(&self, target: &RecordTarget<'_>, ip: Ipv4Addr) -> Result<UpdateResult> {
        tracing::debug!(
            "Updating Cloudflare DNS record {} in zone {} -> {}",
            target.record_id,
            target.zone_id,
            ip
        );

        let request = self
            .client
            .patch(self.url(&format!(
                "/zones/{}/dns_records/{}",
                target.zone_id, target.record_id
            )))
            .json(&ContentPatch {
                content: ip.to_string(),
            });

        let record: DnsRecord = self
            .send(request, target.credential, "record update")
            .await?;

        Ok(UpdateResult {
            record_id: record.id,
            content: record.content,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
