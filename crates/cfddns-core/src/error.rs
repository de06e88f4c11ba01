//! Error types for the DDNS updater
//!
//! Every failure a cycle can hit maps to one variant here. None of them are
//! retried in-process: the scheduler's next tick is the retry.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// No persisted state exists; setup has not been run
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// Persisted state exists but cannot be parsed or fails validation
    #[error("Configuration corrupt: {0}")]
    ConfigCorrupt(String),

    /// The public IP could not be determined
    #[error("IP discovery failed: {0}")]
    IpDiscovery(String),

    /// The DNS provider could not be reached or answered with garbage
    #[error("Provider request failed ({provider}): {message}")]
    ProviderTransport {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The DNS provider answered but refused or altered the update
    #[error("Provider rejected update ({provider}): {message}")]
    ProviderRejected {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Writing the state record failed
    #[error("State store error: {0}")]
    StateStore(String),

    /// Invalid runtime configuration or schedule input
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a "configuration missing" error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// Create a "configuration corrupt" error
    pub fn config_corrupt(msg: impl Into<String>) -> Self {
        Self::ConfigCorrupt(msg.into())
    }

    /// Create an IP discovery error
    pub fn ip_discovery(msg: impl Into<String>) -> Self {
        Self::IpDiscovery(msg.into())
    }

    /// Create a provider transport error
    pub fn provider_transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderTransport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a provider rejection error
    pub fn provider_rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRejected {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Cycle phase this error belongs to, for log context
    pub fn phase(&self) -> &'static str {
        match self {
            Error::ConfigMissing(_) | Error::ConfigCorrupt(_) => "load",
            Error::IpDiscovery(_) => "discover",
            Error::ProviderTransport { .. } | Error::ProviderRejected { .. } => "update",
            Error::StateStore(_) => "persist",
            Error::Config(_) => "config",
        }
    }

    /// Whether the operator has to (re-)run setup before the next cycle can succeed
    pub fn requires_setup(&self) -> bool {
        matches!(self, Error::ConfigMissing(_) | Error::ConfigCorrupt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_mapping() {
        assert_eq!(Error::config_missing("x").phase(), "load");
        assert_eq!(Error::config_corrupt("x").phase(), "load");
        assert_eq!(Error::ip_discovery("x").phase(), "discover");
        assert_eq!(Error::provider_transport("cloudflare", "x").phase(), "update");
        assert_eq!(Error::provider_rejected("cloudflare", "x").phase(), "update");
        assert_eq!(Error::state_store("x").phase(), "persist");
    }

    #[test]
    fn test_only_config_errors_require_setup() {
        assert!(Error::config_missing("x").requires_setup());
        assert!(Error::config_corrupt("x").requires_setup());
        assert!(!Error::ip_discovery("x").requires_setup());
        assert!(!Error::provider_rejected("cloudflare", "x").requires_setup());
        assert!(!Error::config("bad url").requires_setup());
    }

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider_rejected("cloudflare", "Record does not exist");
        assert_eq!(
            err.to_string(),
            "Provider rejected update (cloudflare): Record does not exist"
        );
    }
}
