// # IP Source Trait
//
// Defines the interface for discovering the host's public IPv4 address.
//
// ## Implementations
//
// - HTTP IP-echo service: `cfddns-ip-http` crate

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source is queried once per cycle. It has no side effects on persisted
/// state and must fail with `Error::IpDiscovery` rather than guess.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error)`: If unable to determine it
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;
}
