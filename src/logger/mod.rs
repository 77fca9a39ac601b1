//! Diagnostic output: tracing subscriber with ISO-8601 UTC timestamps.
//!
//! `--verbose` maps to debug-level detail; otherwise only warnings and
//! errors come through. Detached runs keep the subscriber, but the stderr it
//! writes to is redirected to /dev/null by the fork, so verbose output is
//! effectively off in the background no matter what was requested.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoUtc;

/// Environment variable that overrides the verbosity-derived level filter,
/// in standard `EnvFilter` syntax.
pub const LOG_ENV_VAR: &str = "GHB_LOG";

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
