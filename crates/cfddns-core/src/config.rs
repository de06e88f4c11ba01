//! Runtime configuration for the DDNS updater
//!
//! Built once at process start and passed by reference to the state store,
//! the IP source and the provider client. Nothing in the crate reads paths
//! or endpoints from anywhere else.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Directory name shared by the config and log locations
pub const APP_DIR_NAME: &str = "cloudflare_ddns_updater";

/// File name of the persisted state record
pub const STATE_FILE_NAME: &str = "cf_updater_config.json";

/// File name of the operator log
pub const LOG_FILE_NAME: &str = "cf_updater.log";

/// Default IP-echo service (returns the caller's IPv4 as plain text)
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org";

/// Cloudflare API base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variables understood by [`UpdaterConfig::from_env`]
pub mod env_keys {
    pub const STATE_PATH: &str = "CF_DDNS_STATE_PATH";
    pub const LOG_PATH: &str = "CF_DDNS_LOG_PATH";
    pub const IP_SERVICE_URL: &str = "CF_DDNS_IP_SERVICE_URL";
    pub const API_BASE: &str = "CF_DDNS_API_BASE";
    pub const HTTP_TIMEOUT_SECS: &str = "CF_DDNS_HTTP_TIMEOUT_SECS";
    pub const TRACE_LEVEL: &str = "CF_DDNS_TRACE_LEVEL";
    pub const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
    pub const XDG_DATA_HOME: &str = "XDG_DATA_HOME";
}

/// Process-wide updater configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Location of the persisted state record
    pub state_path: PathBuf,

    /// Location of the append-only operator log
    pub log_path: PathBuf,

    /// IP-echo service queried once per cycle
    pub ip_service_url: String,

    /// Base URL of the Cloudflare API
    pub api_base: String,

    /// Upper bound for every HTTP request
    pub http_timeout: Duration,

    /// Maximum tracing level written to the log (trace|debug|info|warn|error)
    pub trace_level: String,
}

impl UpdaterConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as unset. Paths fall back to the XDG base
    /// directories, then to `~/.config` and `~/.local/share`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let state_path = match get(env_keys::STATE_PATH) {
            Some(path) => PathBuf::from(path),
            None => base_dir(get(env_keys::XDG_CONFIG_HOME), &[".config"])?
                .join(APP_DIR_NAME)
                .join(STATE_FILE_NAME),
        };

        let log_path = match get(env_keys::LOG_PATH) {
            Some(path) => PathBuf::from(path),
            None => base_dir(get(env_keys::XDG_DATA_HOME), &[".local", "share"])?
                .join(APP_DIR_NAME)
                .join(LOG_FILE_NAME),
        };

        let http_timeout = match get(env_keys::HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::config(format!(
                        "{} must be a whole number of seconds. Got: {}",
                        env_keys::HTTP_TIMEOUT_SECS,
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            state_path,
            log_path,
            ip_service_url: get(env_keys::IP_SERVICE_URL)
                .unwrap_or_else(|| DEFAULT_IP_SERVICE_URL.to_string()),
            api_base: get(env_keys::API_BASE)
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            http_timeout,
            trace_level: get(env_keys::TRACE_LEVEL)
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_url(env_keys::IP_SERVICE_URL, &self.ip_service_url)?;
        validate_url(env_keys::API_BASE, &self.api_base)?;

        let secs = self.http_timeout.as_secs();
        if !(1..=300).contains(&secs) {
            return Err(Error::config(format!(
                "{} must be between 1 and 300 seconds. Got: {}",
                env_keys::HTTP_TIMEOUT_SECS,
                secs
            )));
        }

        match self.trace_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(Error::config(format!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    env_keys::TRACE_LEVEL,
                    other
                )));
            }
        }

        if self.state_path.file_name().is_none() {
            return Err(Error::config(format!(
                "State path has no file name: {}",
                self.state_path.display()
            )));
        }
        if self.log_path.file_name().is_none() {
            return Err(Error::config(format!(
                "Log path has no file name: {}",
                self.log_path.display()
            )));
        }

        Ok(())
    }
}

fn base_dir(xdg: Option<String>, home_fallback: &[&str]) -> Result<PathBuf> {
    if let Some(dir) = xdg {
        return Ok(PathBuf::from(dir));
    }
    let mut dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Cannot determine the home directory"))?;
    for part in home_fallback {
        dir.push(part);
    }
    Ok(dir)
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            key, url
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_xdg_paths() {
        let config = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
        ]))
        .unwrap();

        assert_eq!(
            config.state_path,
            PathBuf::from("/tmp/cfg/cloudflare_ddns_updater/cf_updater_config.json")
        );
        assert_eq!(
            config.log_path,
            PathBuf::from("/tmp/data/cloudflare_ddns_updater/cf_updater.log")
        );
        assert_eq!(config.ip_service_url, DEFAULT_IP_SERVICE_URL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_overrides_win() {
        let config = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
            ("CF_DDNS_STATE_PATH", "/srv/ddns/state.json"),
            ("CF_DDNS_API_BASE", "http://127.0.0.1:9000/"),
            ("CF_DDNS_HTTP_TIMEOUT_SECS", "5"),
            ("CF_DDNS_TRACE_LEVEL", "DEBUG"),
        ]))
        .unwrap();

        assert_eq!(config.state_path, PathBuf::from("/srv/ddns/state.json"));
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.trace_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
            ("CF_DDNS_IP_SERVICE_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.ip_service_url, DEFAULT_IP_SERVICE_URL);
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
            ("CF_DDNS_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(Error::Config(_))));

        let config = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
            ("CF_DDNS_HTTP_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme_and_level() {
        let mut config = UpdaterConfig::from_lookup(lookup_from(&[
            ("XDG_CONFIG_HOME", "/tmp/cfg"),
            ("XDG_DATA_HOME", "/tmp/data"),
        ]))
        .unwrap();

        config.ip_service_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.ip_service_url = DEFAULT_IP_SERVICE_URL.to_string();
        config.trace_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
