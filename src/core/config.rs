//! Immutable daemon configuration resolved once at startup.
//!
//! Values come from the command line, optionally layered over a TOML config
//! file (`--config`). CLI flags win. After resolution nothing mutates: the
//! probe set, the controller, and the lifecycle manager all borrow the same
//! frozen value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli_app::Cli;
use crate::core::errors::{GhbError, Result};

/// Fallback inter-cycle sleep when `--seconds` is unset or zero.
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Fallback connect-probe timeout when `--connect-timeout` is unset or zero.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 1;

/// Utility spoken to for enable/mark-active when no override is given.
pub const DEFAULT_MONITOR_PROGRAM: &str = "vmware-appmonitor";

/// Fully resolved runtime configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Skip real liveness signaling; enable and mark-active always succeed.
    pub dummy: bool,
    /// Emit debug-level diagnostics. Has no visible effect once detached,
    /// since the standard streams no longer lead anywhere.
    pub verbose: bool,
    /// Stay attached to the invoking session instead of forking.
    pub foreground: bool,
    /// Sleep between probe cycles.
    pub interval: Duration,
    /// How long the connect probe may wait for a TCP connection.
    pub connect_timeout: Duration,
    /// Program used to reach the hypervisor app-monitor channel.
    pub monitor_program: PathBuf,
    /// Shell command for the command probe, if that probe is enabled.
    pub test_system: Option<String>,
    /// Scratch-file path for the file-write probe, if enabled.
    pub test_fopen: Option<PathBuf>,
    /// `host:port` target for the connect probe, if enabled.
    pub test_connect: Option<String>,
    /// Hostname for the ping probe, if enabled.
    pub test_ping: Option<String>,
}

impl Config {
    /// Resolve the final configuration from CLI flags and the optional file.
    ///
    /// # Errors
    /// Returns a configuration error when the file is missing, unreadable,
    /// or not valid TOML.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        Ok(Self {
            dummy: cli.dummy || file.dummy.unwrap_or(false),
            verbose: cli.verbose || file.verbose.unwrap_or(false),
            foreground: cli.foreground || file.foreground.unwrap_or(false),
            interval: positive_secs(cli.seconds.or(file.seconds), DEFAULT_INTERVAL_SECS),
            connect_timeout: positive_secs(
                cli.connect_timeout.or(file.connect_timeout),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
            monitor_program: cli
                .monitor_program
                .clone()
                .or(file.monitor_program)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MONITOR_PROGRAM)),
            test_system: cli.test_system.clone().or(file.test_system),
            test_fopen: cli.test_fopen.clone().or(file.test_fopen),
            test_connect: cli.test_connect.clone().or(file.test_connect),
            test_ping: cli.test_ping.clone().or(file.test_ping),
        })
    }
}

/// Unset and zero both mean "use the default": a daemon that never sleeps or
/// a connect that never waits is not a meaningful configuration.
fn positive_secs(value: Option<u64>, default: u64) -> Duration {
    match value {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        _ => Duration::from_secs(default),
    }
}

/// On-disk configuration shape. Every key is optional; unknown keys are a
/// configuration error rather than a silent no-op.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    dummy: Option<bool>,
    verbose: Option<bool>,
    foreground: Option<bool>,
    seconds: Option<u64>,
    connect_timeout: Option<u64>,
    monitor_program: Option<PathBuf>,
    test_system: Option<String>,
    test_fopen: Option<PathBuf>,
    test_connect: Option<String>,
    test_ping: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GhbError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| GhbError::ConfigParse {
            context: "read",
            details: format!("{}: {source}", path.display()),
        })?;
        Ok(toml::from_str(&raw)?)
    }
}
