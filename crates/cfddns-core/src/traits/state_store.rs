// # State Store Trait
//
// Defines the interface for persisting the installation's state record.
//
// ## Purpose
//
// The state store makes repeated cycles idempotent by remembering:
// - The last IP the provider confirmed
// - The forced-refresh counter
// - Credentials and identifiers written by setup
//
// ## Usage
//
// ```rust,ignore
// let mut state = store.load().await?;
// state.reset_if_due();
// store.save(&state).await?;
// ```

use async_trait::async_trait;

use crate::state::State;

/// Trait for state store implementations
///
/// The record is always handled whole: callers load it, mutate the copy in
/// memory and save it back. There are no per-field setters.
///
/// # Implementation Guidelines
///
/// - `save` must be atomic: a concurrent reader sees either the previous
///   record or the new one, never a truncated file
/// - `save` must leave the previous record intact when it fails
/// - Persistent implementations restrict the record to its owner
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted record
    ///
    /// # Returns
    ///
    /// - `Ok(State)`: The validated record
    /// - `Err(Error::ConfigMissing)`: No record exists (setup not run)
    /// - `Err(Error::ConfigCorrupt)`: The record is unreadable or invalid
    async fn load(&self) -> Result<State, crate::Error>;

    /// Persist the full record
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The new record is durable
    /// - `Err(Error::StateStore)`: Nothing was replaced
    async fn save(&self, state: &State) -> Result<(), crate::Error>;
}
