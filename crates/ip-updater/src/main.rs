// # ip-updater - scheduled DDNS cycle
//
// Thin entry point invoked by cron once per tick. It is responsible for:
// 1. Reading runtime configuration from environment variables
// 2. Initializing the operator log
// 3. Building the IP source, the Cloudflare client and the state store
// 4. Running exactly one reconciliation cycle
// 5. Mapping the outcome to a process exit code
//
// All reconciliation logic lives in cfddns-core.
//
// ## Configuration
//
// All variables are optional:
// - `CF_DDNS_STATE_PATH`: State record (default `$XDG_CONFIG_HOME/cloudflare_ddns_updater/cf_updater_config.json`)
// - `CF_DDNS_LOG_PATH`: Operator log (default `$XDG_DATA_HOME/cloudflare_ddns_updater/cf_updater.log`)
// - `CF_DDNS_IP_SERVICE_URL`: IP-echo service (default `https://api.ipify.org`)
// - `CF_DDNS_API_BASE`: Cloudflare API base URL
// - `CF_DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout, 1-300 (default 30)
// - `CF_DDNS_TRACE_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// */2 * * * * /usr/local/bin/ip-updater
// ```

use anyhow::{Context, Result};
use cfddns_core::{CycleOutcome, FileStateStore, Reconciler, UpdaterConfig};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{Level, debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Hint printed when the state record is missing or unusable
const SETUP_HINT: &str = "Please run 'cloudflare-ddns-updater --setup'";

/// Exit codes for the scheduled run
///
/// - 0: Cycle completed, with or without a DNS update
/// - 1: Configuration problem; setup has to run before the next cycle can succeed
/// - 2: Cycle failed; the next tick retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdaterExitCode {
    /// Cycle completed
    Success = 0,
    /// Missing or corrupt state, or invalid runtime configuration
    ConfigError = 1,
    /// Discovery, provider or persistence failure
    CycleFailed = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl UpdaterExitCode {
    fn for_cycle(result: &cfddns_core::Result<CycleOutcome>) -> Self {
        match result {
            Ok(_) => UpdaterExitCode::Success,
            Err(e) if e.requires_setup() => UpdaterExitCode::ConfigError,
            Err(cfddns_core::Error::Config(_)) => UpdaterExitCode::ConfigError,
            Err(_) => UpdaterExitCode::CycleFailed,
        }
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match UpdaterConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    // Held until main returns so buffered log lines are flushed
    let _log_guard = match init_tracing(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    // One cycle on one thread; nothing runs concurrently
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::CycleFailed.into();
        }
    };

    let result = rt.block_on(run_once(&config));
    let code = UpdaterExitCode::for_cycle(&result);

    match &result {
        Ok(outcome) => debug!("Cycle finished: {:?}", outcome),
        Err(e) if e.requires_setup() => eprintln!("Failed to load configuration.\n{}", SETUP_HINT),
        Err(e) => eprintln!("{}", e),
    }

    code.into()
}

/// Run one reconciliation cycle
async fn run_once(config: &UpdaterConfig) -> cfddns_core::Result<CycleOutcome> {
    build_reconciler(config)?.run_cycle().await
}

/// Build the collaborators, recording any failure in the operator log
fn build_reconciler(config: &UpdaterConfig) -> cfddns_core::Result<Reconciler> {
    let ip_source = HttpIpSource::from_config(config).map_err(log_setup_error("IP source"))?;
    let provider =
        CloudflareProvider::from_config(config).map_err(log_setup_error("Cloudflare client"))?;
    let state_store = FileStateStore::from_config(config);

    Ok(Reconciler::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
    ))
}

fn log_setup_error(component: &'static str) -> impl Fn(cfddns_core::Error) -> cfddns_core::Error {
    move |e| {
        error!(phase = e.phase(), "Failed to build {}: {}", component, e);
        e
    }
}

/// Install a plain-text subscriber appending to the operator log
fn init_tracing(config: &UpdaterConfig) -> Result<WorkerGuard> {
    let level = Level::from_str(&config.trace_level)
        .with_context(|| format!("invalid trace level '{}'", config.trace_level))?;

    let directory = config
        .log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config
        .log_path
        .file_name()
        .with_context(|| format!("log path {} has no file name", config.log_path.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("cannot open log file {}", config.log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(guard)
}
