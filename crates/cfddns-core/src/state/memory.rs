// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Holds the state record inside the process. Useful when embedding the
// reconciler in a long-running program that persists state elsewhere, and
// for tests.
//
// ## Crash Behavior
//
// - The record is lost when the process exits
// - An empty store behaves like an installation where setup never ran

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::state::State;
use crate::traits::state_store::StateStore;

/// In-memory state store implementation
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,no_run
/// use cfddns_core::state::{ForceSchedule, MemoryStateStore, State};
/// use cfddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let schedule = ForceSchedule::new(1, 2)?;
///     let store = MemoryStateStore::with_state(State::new("zone", "record", "token", schedule));
///
///     let state = store.load().await?;
///     assert_eq!(state.counter, 720);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<State>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `state`
    pub fn with_state(state: State) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(state))),
        }
    }

    /// Current record, if any
    pub async fn snapshot(&self) -> Option<State> {
        self.inner.read().await.clone()
    }

    /// Drop the record
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<State, Error> {
        let guard = self.inner.read().await;
        let state = guard
            .clone()
            .ok_or_else(|| Error::config_missing("no state record in memory"))?;
        state.validate()?;
        Ok(state)
    }

    async fn save(&self, state: &State) -> Result<(), Error> {
        *self.inner.write().await = Some(state.clone());
        Ok(())
    }
}
