// # State Record
//
// The single persisted record of an installation.
//
// ## File Format
//
// The on-disk keys are the ones the setup tool writes, so an existing
// installation is read as-is:
//
// ```json
// {
//   "ZONE_ID": "023e105f4ecef8ad9ca31a8372d0c353",
//   "DNS_RECORD_ID": "372e67954025e0ba6aaa6d586b9e0b59",
//   "API_TOKEN": "...",
//   "CURRENT_IP": "203.0.113.5",
//   "COUNTER": 719,
//   "FORCE_IP": 720,
//   "DAYS_INTERVAL": "1",
//   "LOG_LEVEL": "full"
// }
// ```
//
// `CURRENT_IP` holds `"none"` when no address is known to be applied.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::dns_provider::RecordTarget;

/// On-disk spelling of "no known IP"
pub const NO_IP_SENTINEL: &str = "none";

const MINUTES_PER_DAY: u64 = 1440;

/// Verbosity of the operator log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every cycle's outcome, including no-ops
    #[default]
    Full,
    /// Errors and detected IP changes only
    Minimal,
}

impl LogLevel {
    /// Whether no-op cycles are logged
    pub fn is_full(self) -> bool {
        matches!(self, LogLevel::Full)
    }

    /// The other level
    pub fn toggled(self) -> Self {
        match self {
            LogLevel::Full => LogLevel::Minimal,
            LogLevel::Minimal => LogLevel::Full,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Full => f.write_str("full"),
            LogLevel::Minimal => f.write_str("minimal"),
        }
    }
}

/// Cloudflare bearer token
///
/// The Debug implementation never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl From<String> for ApiToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for ApiToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Cron interval and forced-refresh period chosen by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceSchedule {
    days: u32,
    cron_minutes: u32,
}

impl ForceSchedule {
    /// Create a schedule
    ///
    /// `days` must be in 1..=365 and `cron_minutes` in 1..=59.
    pub fn new(days: u32, cron_minutes: u32) -> Result<Self> {
        if !(1..=365).contains(&days) {
            return Err(Error::config(format!(
                "Forced refresh period must be between 1 and 365 days. Got: {}",
                days
            )));
        }
        if !(1..=59).contains(&cron_minutes) {
            return Err(Error::config(format!(
                "Schedule interval must be between 1 and 59 minutes. Got: {}",
                cron_minutes
            )));
        }
        Ok(Self { days, cron_minutes })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn cron_minutes(&self) -> u32 {
        self.cron_minutes
    }

    /// Number of cycles between forced refreshes, never less than 1
    pub fn runs(&self) -> u32 {
        let runs = u64::from(self.days) * MINUTES_PER_DAY / u64::from(self.cron_minutes);
        u32::try_from(runs).unwrap_or(u32::MAX).max(1)
    }
}

/// Persisted state of an installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Cloudflare zone identifier
    #[serde(rename = "ZONE_ID")]
    pub zone_id: String,

    /// Identifier of the managed A record
    #[serde(rename = "DNS_RECORD_ID")]
    pub record_id: String,

    /// Bearer token for the Cloudflare API
    #[serde(rename = "API_TOKEN")]
    pub credential: ApiToken,

    /// Last IP the provider confirmed for the record
    #[serde(rename = "CURRENT_IP", with = "ip_or_none")]
    pub current_ip: Option<Ipv4Addr>,

    /// Cycles left before the next forced refresh
    #[serde(rename = "COUNTER")]
    pub counter: u32,

    /// Cycles between forced refreshes
    #[serde(rename = "FORCE_IP")]
    pub force_interval: u32,

    /// Forced refresh period in days, `None` when unconfigured
    #[serde(rename = "DAYS_INTERVAL", with = "days_interval", default)]
    pub days_interval: Option<u32>,

    /// Operator log verbosity
    #[serde(rename = "LOG_LEVEL")]
    pub log_level: LogLevel,
}

impl State {
    /// Create a fresh record for a managed DNS record
    ///
    /// The first cycle after this always pushes the IP to the provider.
    pub fn new(
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        credential: impl Into<ApiToken>,
        schedule: ForceSchedule,
    ) -> Self {
        let runs = schedule.runs();
        Self {
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            credential: credential.into(),
            current_ip: None,
            counter: runs,
            force_interval: runs,
            days_interval: Some(schedule.days()),
            log_level: LogLevel::Full,
        }
    }

    /// Parse and validate a serialized record
    pub fn from_json(raw: &str) -> Result<Self> {
        let state: State = serde_json::from_str(raw).map_err(|e| Error::config_corrupt(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    /// Serialize the record
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.zone_id.trim().is_empty() {
            return Err(Error::config_corrupt("ZONE_ID is empty"));
        }
        if self.record_id.trim().is_empty() {
            return Err(Error::config_corrupt("DNS_RECORD_ID is empty"));
        }
        if self.credential.is_empty() {
            return Err(Error::config_corrupt("API_TOKEN is empty"));
        }
        if self.force_interval == 0 {
            return Err(Error::config_corrupt(
                "FORCE_IP is 0; the update schedule was never configured",
            ));
        }
        Ok(())
    }

    /// Reset the counter when a forced refresh is due
    ///
    /// Returns `true` when the counter was at or below one. It is then set
    /// back to `force_interval` and `current_ip` is cleared, so the cycle
    /// pushes the IP regardless of what was cached.
    pub fn reset_if_due(&mut self) -> bool {
        if self.counter > 1 {
            return false;
        }
        self.counter = self.force_interval;
        self.current_ip = None;
        true
    }

    /// Count one no-op cycle towards the next forced refresh
    pub fn count_down(&mut self) {
        self.counter = self.counter.saturating_sub(1);
    }

    /// Install a new schedule
    ///
    /// Clears `current_ip` so the next cycle pushes the address.
    pub fn apply_schedule(&mut self, schedule: ForceSchedule) {
        let runs = schedule.runs();
        self.current_ip = None;
        self.counter = runs;
        self.force_interval = runs;
        self.days_interval = Some(schedule.days());
    }

    /// The record the provider must update
    pub fn target(&self) -> RecordTarget<'_> {
        RecordTarget {
            zone_id: &self.zone_id,
            record_id: &self.record_id,
            credential: &self.credential,
        }
    }
}

mod ip_or_none {
    use super::NO_IP_SENTINEL;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::net::Ipv4Addr;

    pub fn serialize<S: Serializer>(ip: &Option<Ipv4Addr>, s: S) -> Result<S::Ok, S::Error> {
        match ip {
            Some(ip) => s.collect_str(ip),
            None => s.serialize_str(NO_IP_SENTINEL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Ipv4Addr>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case(NO_IP_SENTINEL) => Ok(None),
            Some(s) => s
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("CURRENT_IP is not an IPv4 address: {}", s))),
        }
    }
}

mod days_interval {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(days: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match days {
            Some(days) => s.collect_str(days),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Number(days)) => Ok(Some(days)),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Raw::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("DAYS_INTERVAL is not a number: {}", text))),
        }
    }
}
