// # ifmond - Interface Monitor Daemon
//
// This daemon is a THIN integration layer over ifmon-core:
// - DO NOT add reconciliation or notification logic here
// - All monitor logic lives in ifmon-core
// - Configuration is via environment variables, optionally seeded from a
//   JSON file
//
// The ifmond daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the netlink sources into the interface monitor
// 4. Mapping the monitor's outcome to an exit code
//
// ## Configuration
//
// - `IFMON_CONFIG`: Path to a JSON `MonitorConfig` file (optional, loaded
//   first; the variables below override it)
// - `IFMON_RESYNC_INTERVAL_SECS`: Seconds between full resyncs (1-3600)
// - `IFMON_REMOVAL_POLICY`: What a resync does with vanished interfaces
//   (`silent`, `notify_down`)
// - `IFMON_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export IFMON_RESYNC_INTERVAL_SECS=30
// export IFMON_REMOVAL_POLICY=notify_down
//
// ifmond
// ```

use anyhow::{Context, Result};
use ifmon_core::{InterfaceMonitor, LoggingNotifier, MonitorConfig, ResyncRemovalPolicy};
use ifmon_netlink::{NetlinkEventSource, NetlinkListingSource};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (the monitor stopped on a fatal condition)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfmonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (fatal monitor condition)
    RuntimeError = 2,
}

impl From<IfmonExitCode> for ExitCode {
    fn from(code: IfmonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug, Default)]
struct Config {
    config_path: Option<String>,
    resync_interval_secs: Option<String>,
    removal_policy: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("IFMON_CONFIG").ok(),
            resync_interval_secs: env::var("IFMON_RESYNC_INTERVAL_SECS").ok(),
            removal_policy: env::var("IFMON_REMOVAL_POLICY").ok(),
            log_level: env::var("IFMON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.config_path
            && path.is_empty()
        {
            anyhow::bail!("IFMON_CONFIG cannot be empty when set");
        }

        if let Some(interval) = self.resync_interval()?
            && !(1..=3600).contains(&interval)
        {
            anyhow::bail!(
                "IFMON_RESYNC_INTERVAL_SECS must be between 1 and 3600 seconds. Got: {}",
                interval
            );
        }

        self.removal_policy()?;
        self.log_level()?;

        Ok(())
    }

    fn resync_interval(&self) -> Result<Option<u64>> {
        self.resync_interval_secs
            .as_deref()
            .map(|raw| {
                raw.trim().parse::<u64>().with_context(|| {
                    format!("IFMON_RESYNC_INTERVAL_SECS is not a number: '{}'", raw)
                })
            })
            .transpose()
    }

    fn removal_policy(&self) -> Result<Option<ResyncRemovalPolicy>> {
        self.removal_policy
            .as_deref()
            .map(|raw| {
                raw.parse::<ResyncRemovalPolicy>().map_err(|_| {
                    anyhow::anyhow!(
                        "IFMON_REMOVAL_POLICY '{}' is not valid. \
                        Valid policies: silent, notify_down",
                        raw
                    )
                })
            })
            .transpose()
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "IFMON_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the monitor configuration: file first, then env overrides
    fn monitor_config(&self) -> Result<MonitorConfig> {
        let mut config = match self.config_path {
            Some(ref path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read IFMON_CONFIG file {}", path))?;
                MonitorConfig::from_json_str(&json)
                    .with_context(|| format!("Invalid monitor config in {}", path))?
            }
            None => MonitorConfig::new(),
        };

        if let Some(interval) = self.resync_interval()? {
            config = config.with_resync_interval_secs(interval);
        }
        if let Some(policy) = self.removal_policy()? {
            config = config.with_removal_policy(policy);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return IfmonExitCode::ConfigError.into();
    }

    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return IfmonExitCode::ConfigError.into();
    }

    let monitor_config = match config.monitor_config() {
        Ok(monitor_config) => monitor_config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return IfmonExitCode::ConfigError.into();
        }
    };

    info!("Starting ifmond daemon");
    info!(
        resync_interval_secs = monitor_config.resync_interval_secs,
        removal_policy = ?monitor_config.removal_policy,
        "Configuration loaded"
    );

    let monitor = match InterfaceMonitor::new(
        Box::new(NetlinkEventSource::new()),
        Box::new(NetlinkListingSource::new()),
        Box::new(LoggingNotifier),
        monitor_config,
    ) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to create interface monitor: {}", e);
            return IfmonExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return IfmonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(monitor).await {
            error!("Daemon error: {:#}", e);
            IfmonExitCode::RuntimeError
        } else {
            IfmonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the monitor until it fails or a shutdown signal arrives
async fn run_daemon(mut monitor: InterfaceMonitor) -> Result<()> {
    tokio::select! {
        result = monitor.run() => {
            result.context("Interface monitor stopped")?;
            Ok(())
        }
        signal = wait_for_shutdown() => {
            let signal = signal?;
            info!("Received shutdown signal: {}", signal);
            info!("Shutting down daemon");
            Ok(())
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
