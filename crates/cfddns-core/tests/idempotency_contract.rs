//! Contract Test: Steady-State Idempotency
//!
//! Constraints verified:
//! - An unchanged IP never reaches the provider
//! - The counter drops by exactly one per no-op cycle
//! - The no-op path still persists the record, once per cycle
//! - Reloading and saving a record changes nothing
//!
//! If this test fails, the updater is spending provider calls on no-ops.

mod common;

use cfddns_core::state::FileStateStore;
use cfddns_core::traits::StateStore;
use cfddns_core::{CycleOutcome, Reconciler};
use common::*;
use std::net::Ipv4Addr;

const CACHED: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 5);

#[tokio::test]
async fn unchanged_ip_decrements_counter_without_provider_call() {
    let provider = MockDnsProvider::new("test");
    let store = CountingStateStore::new(state_with(Some(CACHED), 5, 10));

    let reconciler = Reconciler::new(
        Box::new(FixedIpSource::new(CACHED)),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(store.clone()),
    );

    let outcome = reconciler.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        outcome,
        CycleOutcome::Unchanged {
            ip: CACHED,
            remaining: 4
        }
    );
    assert_eq!(provider.update_call_count(), 0, "no-op must not call the provider");
    assert_eq!(store.load_count(), 1);
    assert_eq!(store.save_count(), 1, "no-op path persists exactly once");

    let saved = store.snapshot().await.unwrap();
    assert_eq!(saved.counter, 4);
    assert_eq!(saved.current_ip, Some(CACHED));
    assert_eq!(saved.force_interval, 10);
}

#[tokio::test]
async fn repeated_cycles_count_down_to_forced_refresh() {
    let provider = MockDnsProvider::new("test");
    let store = CountingStateStore::new(state_with(Some(CACHED), 4, 10));

    let reconciler = Reconciler::new(
        Box::new(FixedIpSource::new(CACHED)),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(store.clone()),
    );

    // 4 -> 3 -> 2 -> 1
    for expected in [3, 2, 1] {
        let outcome = reconciler.run_cycle().await.unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Unchanged {
                ip: CACHED,
                remaining: expected
            }
        );
    }
    assert_eq!(provider.update_call_count(), 0);

    // Counter at 1: the next cycle is forced
    let outcome = reconciler.run_cycle().await.unwrap();
    assert!(outcome.updated());
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.save_count(), 4);
}

#[tokio::test]
async fn reload_and_save_leaves_file_record_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cf_updater_config.json");
    let store = FileStateStore::new(&path);

    store.save(&state_with(Some(CACHED), 7, 10)).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let loaded = store.load().await.unwrap();
    store.save(&loaded).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.load().await.unwrap(), loaded);
}

#[tokio::test]
async fn file_backed_no_op_cycle_persists_counter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cf_updater_config.json");
    FileStateStore::new(&path)
        .save(&state_with(Some(CACHED), 5, 10))
        .await
        .unwrap();

    let provider = MockDnsProvider::new("test");
    let reconciler = Reconciler::new(
        Box::new(FixedIpSource::new(CACHED)),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(FileStateStore::new(&path)),
    );
    reconciler.run_cycle().await.unwrap();

    let saved = FileStateStore::new(&path).load().await.unwrap();
    assert_eq!(saved.counter, 4);
    assert_eq!(saved.current_ip, Some(CACHED));
    assert_eq!(provider.update_call_count(), 0);
}
