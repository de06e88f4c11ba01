//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles count their calls so tests can assert which collaborators a
//! cycle touched, not just what it returned.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::state::{ForceSchedule, MemoryStateStore, State};
use cfddns_core::traits::{DnsProvider, IpSource, RecordTarget, StateStore, UpdateResult};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

/// An IP source that always reports the same address
pub struct FixedIpSource {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }
}

/// An IP source whose lookup always fails
pub struct FailingIpSource;

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        Err(Error::ip_discovery("connection refused"))
    }
}

/// How the mock provider answers an update
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    /// Confirm the requested address
    Confirm,
    /// Report success but hand back different content
    Content(String),
    /// Answer with `success: false`
    Reject(String),
    /// Fail before a response arrives
    Transport(String),
}

/// One recorded update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub zone_id: String,
    pub record_id: String,
    pub token: String,
    pub ip: Ipv4Addr,
}

/// A mock DnsProvider that records every update request
pub struct MockDnsProvider {
    calls: Arc<Mutex<Vec<UpdateCall>>>,
    response: ProviderResponse,
    pub name: &'static str,
}

impl MockDnsProvider {
    pub fn new(name: &'static str) -> Self {
        Self::with_response(name, ProviderResponse::Confirm)
    }

    pub fn with_response(name: &'static str, response: ProviderResponse) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response,
            name,
        }
    }

    /// Create a provider that records into the same call log as `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            calls: Arc::clone(&other.calls),
            response: other.response.clone(),
            name: other.name,
        }
    }

    pub fn update_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, target: &RecordTarget<'_>, ip: Ipv4Addr) -> Result<UpdateResult> {
        self.calls.lock().unwrap().push(UpdateCall {
            zone_id: target.zone_id.to_string(),
            record_id: target.record_id.to_string(),
            token: target.credential.expose().to_string(),
            ip,
        });

        match &self.response {
            ProviderResponse::Confirm => Ok(UpdateResult {
                record_id: target.record_id.to_string(),
                content: ip.to_string(),
            }),
            ProviderResponse::Content(content) => Ok(UpdateResult {
                record_id: target.record_id.to_string(),
                content: content.clone(),
            }),
            ProviderResponse::Reject(message) => {
                Err(Error::provider_rejected(self.name, message.clone()))
            }
            ProviderResponse::Transport(message) => {
                Err(Error::provider_transport(self.name, message.clone()))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

/// A StateStore over MemoryStateStore that counts loads and saves
#[derive(Clone)]
pub struct CountingStateStore {
    inner: MemoryStateStore,
    load_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
}

impl CountingStateStore {
    pub fn new(state: State) -> Self {
        Self::wrapping(MemoryStateStore::with_state(state))
    }

    pub fn empty() -> Self {
        Self::wrapping(MemoryStateStore::new())
    }

    fn wrapping(inner: MemoryStateStore) -> Self {
        Self {
            inner,
            load_count: Arc::new(AtomicUsize::new(0)),
            save_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// The record as the next cycle would see it
    pub async fn snapshot(&self) -> Option<State> {
        self.inner.snapshot().await
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn load(&self) -> Result<State> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn save(&self, state: &State) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        self.inner.save(state).await
    }
}

/// A record as setup leaves it, with a one-day refresh at a 2-minute schedule
pub fn configured_state() -> State {
    State::new(
        "zone-123",
        "record-456",
        "test-token",
        ForceSchedule::new(1, 2).unwrap(),
    )
}

/// A record with a cached IP and an explicit counter
pub fn state_with(current_ip: Option<Ipv4Addr>, counter: u32, force_interval: u32) -> State {
    let mut state = configured_state();
    state.current_ip = current_ip;
    state.counter = counter;
    state.force_interval = force_interval;
    state
}

/// Log lines written by the cycle while a capture is installed
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's events into a fresh buffer until the guard drops
    ///
    /// `#[tokio::test]` runs on a current-thread runtime, so every event of
    /// the awaited cycle lands here.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
