// # cfddns-core
//
// Core library for the Cloudflare DDNS updater.
//
// ## Architecture Overview
//
// One scheduled run of the updater is one reconciliation cycle:
// - **StateStore**: Loads and saves the installation's state record
// - **IpSource**: Discovers the current public IPv4 address
// - **DnsProvider**: Updates the managed DNS record
// - **Reconciler**: Decides between no-op, update and forced update, and
//   persists the result once
//
// ## Design Principles
//
// 1. **Whole-record state**: The record is loaded once and saved once per cycle
// 2. **No partial persistence**: A failed cycle leaves the saved record untouched
// 3. **Scheduler-driven retries**: Nothing is retried in-process
// 4. **Explicit configuration**: Paths and endpoints come from `UpdaterConfig`

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::UpdaterConfig;
pub use engine::{CycleOutcome, Reconciler};
pub use error::{Error, Result};
pub use state::{ApiToken, FileStateStore, ForceSchedule, LogLevel, MemoryStateStore, State};
pub use traits::{DnsProvider, IpSource, RecordTarget, StateStore, UpdateResult};
