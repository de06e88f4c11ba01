//! Core traits for the DDNS updater
//!
//! This module defines the seams between the reconciliation engine and the
//! outside world.
//!
//! - [`IpSource`]: Discover the current public IPv4 address
//! - [`DnsProvider`]: Update the managed DNS record
//! - [`StateStore`]: Load and save the installation's state record

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, RecordTarget, UpdateResult};
pub use state_store::StateStore;
