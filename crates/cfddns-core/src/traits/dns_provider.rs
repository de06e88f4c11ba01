// # DNS Provider Trait
//
// Defines the interface for pushing an address into the managed DNS record.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::DnsProvider;
//
// let result = provider.update_record(&state.target(), "203.0.113.5".parse()?).await?;
// assert_eq!(result.content, "203.0.113.5");
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::state::ApiToken;

/// The record an update is addressed to
#[derive(Debug, Clone, Copy)]
pub struct RecordTarget<'a> {
    /// Zone identifier
    pub zone_id: &'a str,
    /// Record identifier
    pub record_id: &'a str,
    /// Bearer credential authorizing the call
    pub credential: &'a ApiToken,
}

/// What the provider reports after an accepted update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    /// The record identifier the provider returned
    pub record_id: String,
    /// The record content as stored by the provider
    pub content: String,
}

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - One API call per invocation; no retries, no caching
/// - `Ok` only when the provider reported success. The engine, not the
///   provider, checks that `content` matches the requested address
/// - Provider-reported failure maps to `Error::ProviderRejected`
/// - Network or protocol failure maps to `Error::ProviderTransport`
/// - Never logs the credential
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Set the record's content to `ip`
    ///
    /// # Parameters
    ///
    /// - `target`: zone, record and credential to use
    /// - `ip`: the new record content
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: the provider accepted the update
    /// - `Err(Error)`: the update was rejected or could not be sent
    async fn update_record(
        &self,
        target: &RecordTarget<'_>,
        ip: Ipv4Addr,
    ) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
