//! Reconciliation engine
//!
//! The Reconciler runs one cycle per scheduled tick:
//! - Load the state record
//! - Discover the current public IP
//! - Reset the forced-refresh counter when it is due
//! - Count down on no-op cycles; update the DNS record if the IP differs
//!   from the cached one
//! - Save the state record once
//!
//! ## Cycle Flow
//!
//! ```text
//! ┌─────────────┐   load    ┌──────────────┐  current  ┌─────────────┐
//! │ StateStore  │ ────────▶ │  Reconciler  │ ◀──────── │  IpSource   │
//! │             │ ◀──────── │              │           └─────────────┘
//! └─────────────┘   save    └──────────────┘
//!                                  │ update_record (only when changed or forced)
//!                                  ▼
//!                           ┌──────────────┐
//!                           │ DnsProvider  │
//!                           └──────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! Any failure ends the cycle before the save step, so the record on disk
//! keeps its previous content. Because `current_ip` is only advanced after
//! the provider confirms the new content, the next tick repeats the update.

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::state::State;
use crate::traits::{DnsProvider, IpSource, StateStore};
use tracing::{error, info};

/// What a completed cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cached IP matched; no provider call was made
    Unchanged {
        /// The discovered (and cached) address
        ip: Ipv4Addr,
        /// Cycles left before the next forced refresh
        remaining: u32,
    },

    /// The provider confirmed the record now holds `ip`
    Updated {
        /// The cached address before this cycle
        previous: Option<Ipv4Addr>,
        /// The discovered address now in the record
        ip: Ipv4Addr,
        /// Whether the forced-refresh counter triggered this update
        forced: bool,
    },
}

impl CycleOutcome {
    /// Whether the provider was called
    pub fn updated(&self) -> bool {
        matches!(self, CycleOutcome::Updated { .. })
    }
}

/// Core reconciliation engine
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run_cycle()`] once per scheduled tick
///
/// ## Threading
///
/// A cycle awaits each step in order on the calling task. Overlapping
/// cycles against the same store are not guarded against; the scheduler
/// must not start one before the previous has finished.
pub struct Reconciler {
    /// Source of the current public IP
    ip_source: Box<dyn IpSource>,

    /// DNS provider for updating the record
    provider: Box<dyn DnsProvider>,

    /// Persisted state record
    state_store: Box<dyn StateStore>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `state_store`: State store implementation
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
    ) -> Self {
        Self {
            ip_source,
            provider,
            state_store,
        }
    }

    /// Run one reconciliation cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome)`: The cycle completed and the state was saved
    /// - `Err(Error)`: The cycle aborted; the state was not saved
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let mut state = self.state_store.load().await.map_err(|e| {
            error!(phase = e.phase(), "Failed to load configuration: {}", e);
            e
        })?;
        let verbose = state.log_level.is_full();

        let ip = self.ip_source.current().await.map_err(|e| {
            error!(phase = e.phase(), "Error occurred while fetching public IP: {}", e);
            e
        })?;
        if verbose {
            info!("Retrieved current IP address: {}", ip);
        }

        let previous = state.current_ip;
        let forced = state.reset_if_due();

        if state.current_ip == Some(ip) {
            state.count_down();
            if verbose {
                info!("No address change detected ({} cycles until forced update)", state.counter);
            }
            self.persist(&state).await?;
            return Ok(CycleOutcome::Unchanged {
                ip,
                remaining: state.counter,
            });
        }

        if forced {
            info!("Forcing IP address update: {}", ip);
        } else {
            info!("IP address has changed: {}", ip);
        }

        let result = self
            .provider
            .update_record(&state.target(), ip)
            .await
            .map_err(|e| {
                error!(
                    phase = e.phase(),
                    provider = self.provider.provider_name(),
                    "Error occurred during DNS update: {}",
                    e
                );
                e
            })?;

        let confirmed: Option<Ipv4Addr> = result.content.trim().parse().ok();
        if confirmed != Some(ip) {
            let err = Error::provider_rejected(
                self.provider.provider_name(),
                format!(
                    "record {} holds '{}' after update, expected {}",
                    result.record_id, result.content, ip
                ),
            );
            error!(phase = err.phase(), "Error updating DNS record: {}", err);
            return Err(err);
        }

        info!(
            "IP address in {} updated to: {}",
            self.provider.provider_name(),
            result.content
        );
        state.current_ip = Some(ip);
        self.persist(&state).await?;

        Ok(CycleOutcome::Updated {
            previous,
            ip,
            forced,
        })
    }

    async fn persist(&self, state: &State) -> Result<()> {
        self.state_store.save(state).await.map_err(|e| {
            error!(phase = e.phase(), "Failed to save state: {}", e);
            e
        })
    }
}
