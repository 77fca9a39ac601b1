//! Top-level CLI definition.
//!
//! The flag surface mirrors the long-standing heartbeater interface, so
//! existing service units keep working: probe targets are opt-in flags, and
//! the daemon backgrounds itself unless `--foreground` is given.

use std::path::PathBuf;

use clap::Parser;

/// Guest Heartbeat Helper — sends hypervisor heartbeats only while the guest
/// proves it is alive.
#[derive(Debug, Parser)]
#[command(name = "ghb", version, about)]
pub struct Cli {
    /// Do not send anything to the hypervisor; enable and mark-active always
    /// count as successful.
    #[arg(short = 'd', long)]
    pub dummy: bool,

    /// Print extra debug info.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Do not fork into the background.
    #[arg(short = 'f', long)]
    pub foreground: bool,

    /// Sleep between test cycles, in seconds (0 means the 10s default).
    #[arg(short = 's', long, value_name = "SECONDS")]
    pub seconds: Option<u64>,

    /// Timeout for the connect test to complete, in seconds (0 means the 1s
    /// default).
    #[arg(long, value_name = "SECONDS")]
    pub connect_timeout: Option<u64>,

    /// Test using a command passed to `sh -c`.
    #[arg(long, value_name = "COMMAND")]
    pub test_system: Option<String>,

    /// Test by creating and deleting a scratch file at the given path.
    #[arg(long, value_name = "PATH")]
    pub test_fopen: Option<PathBuf>,

    /// Test using a TCP connect to `host:port`.
    #[arg(long, value_name = "HOST:PORT")]
    pub test_connect: Option<String>,

    /// Test using an ICMP echo to the given host (needs a raw socket).
    #[arg(long, value_name = "HOST")]
    pub test_ping: Option<String>,

    /// Layer settings from a TOML config file under the command-line flags.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Program used to reach the hypervisor app-monitor channel.
    #[arg(long, value_name = "PROGRAM")]
    pub monitor_program: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser as _;

    #[test]
    fn short_flags_match_the_historical_surface() {
        let cli = Cli::try_parse_from(["ghb", "-d", "-v", "-f", "-s", "5"])
            .expect("short flags should parse");
        assert!(cli.dummy);
        assert!(cli.verbose);
        assert!(cli.foreground);
        assert_eq!(cli.seconds, Some(5));
    }

    #[test]
    fn probe_targets_are_independent_options() {
        let cli = Cli::try_parse_from([
            "ghb",
            "--test-system",
            "true",
            "--test-connect",
            "localhost:22",
        ])
        .expect("probe flags should parse");
        assert_eq!(cli.test_system.as_deref(), Some("true"));
        assert_eq!(cli.test_connect.as_deref(), Some("localhost:22"));
        assert!(cli.test_fopen.is_none());
        assert!(cli.test_ping.is_none());
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["ghb", "--test-quantum", "x"]).is_err());
    }
}
