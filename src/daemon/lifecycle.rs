//! Startup lifecycle: acquire the monitoring capability, optionally detach,
//! then hand control to the heartbeat loop.

use daemonize::Daemonize;
use tracing::debug;

use crate::core::config::Config;
use crate::core::errors::{GhbError, Result};
use crate::daemon::loop_main::HeartbeatController;
use crate::monitor::AppMonitor;
use crate::probe::ProbeSet;

/// Where the process is in its lifetime. The state only moves forward:
/// `Starting` → (`Foreground` | `Detached`) → `Running` → `Terminating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Before the execution mode has been decided.
    Starting,
    /// Attached to the invoking session; diagnostics stay visible.
    Foreground,
    /// Forked into the background with standard streams gone.
    Detached,
    /// Inside the heartbeat loop.
    Running,
    /// The loop stopped; the process is on its way out.
    Terminating,
}

/// Drives the daemon from process start to the end of the heartbeat loop.
pub struct Lifecycle<'a> {
    config: &'a Config,
    monitor: &'a dyn AppMonitor,
    state: DaemonState,
}

impl<'a> Lifecycle<'a> {
    /// Lifecycle for the given configuration and signaling capability.
    pub fn new(config: &'a Config, monitor: &'a dyn AppMonitor) -> Self {
        Self {
            config,
            monitor,
            state: DaemonState::Starting,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DaemonState {
        self.state
    }

    /// Run the whole lifetime: enable monitoring, pick the execution mode,
    /// then loop until the first failure.
    ///
    /// Never returns `Ok`: either startup fails, or the loop eventually stops
    /// and its terminating failure comes back. In background mode the parent
    /// process exits 0 inside the detach step and only the child returns.
    pub fn run(&mut self, probes: ProbeSet) -> Result<()> {
        self.enable_monitoring()?;
        self.transition_to_execution_mode()?;

        self.state = DaemonState::Running;
        debug!(
            probes = probes.len(),
            "guest application monitoring enabled"
        );

        let controller = HeartbeatController::new(self.config, probes, self.monitor);
        let failure = controller.run();
        self.state = DaemonState::Terminating;
        Err(failure)
    }

    /// Acquire the liveness-signaling capability, once. Dummy mode skips the
    /// real call and always succeeds.
    fn enable_monitoring(&self) -> Result<()> {
        if self.config.dummy {
            debug!("dummy mode: skipping app monitor enable");
            return Ok(());
        }
        self.monitor.enable()
    }

    /// One-time `Starting` → `Foreground` | `Detached` transition. Detaching
    /// forks: the parent exits 0 immediately, and the child continues with
    /// umask 0, working directory `/`, and standard streams pointing at
    /// /dev/null — after which verbose diagnostics have nowhere to go.
    fn transition_to_execution_mode(&mut self) -> Result<()> {
        if self.config.foreground {
            debug!("staying in the foreground");
            self.state = DaemonState::Foreground;
            return Ok(());
        }

        Daemonize::new()
            .working_directory("/")
            .umask(0o000)
            .start()
            .map_err(|source| GhbError::DetachFailed {
                details: source.to_string(),
            })?;
        self.state = DaemonState::Detached;
        Ok(())
    }
}
