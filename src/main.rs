//! Binary entry point for `ghb`.

use std::process::ExitCode;

use clap::Parser as _;
use tracing::error;

use guest_heartbeat_helper::cli_app::Cli;
use guest_heartbeat_helper::core::config::Config;
use guest_heartbeat_helper::daemon::lifecycle::Lifecycle;
use guest_heartbeat_helper::logger;
use guest_heartbeat_helper::monitor::AppMonitorCommand;
use guest_heartbeat_helper::probe::ProbeSet;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(parse_error) => {
            // Help and version ride the error path too; only real parse
            // failures exit nonzero.
            let failed = parse_error.use_stderr();
            let _ = parse_error.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(failure) => {
            eprintln!("{failure}");
            return ExitCode::FAILURE;
        }
    };
    logger::init(config.verbose);

    let monitor = AppMonitorCommand::new(config.monitor_program.clone());
    let probes = ProbeSet::from_config(&config);
    let mut lifecycle = Lifecycle::new(&config, &monitor);

    // The loop never returns success; exit 0 happens only in the detached
    // parent, inside the fork. Everything that comes back here is a failure.
    if let Err(failure) = lifecycle.run(probes) {
        if failure.is_probe() {
            error!(code = failure.code(), "liveness could not be confirmed: {failure}");
        } else {
            error!(code = failure.code(), "{failure}");
        }
    }
    ExitCode::FAILURE
}
