//! Main heartbeat loop: probe, signal, sleep, repeat until the first failure.

use std::thread;

use tracing::debug;

use crate::core::config::Config;
use crate::core::errors::{GhbError, Result};
use crate::monitor::AppMonitor;
use crate::probe::ProbeSet;

/// Sequences one probe-signal-sleep cycle after another.
///
/// There is no retry and no backoff: the first failed probe or rejected
/// heartbeat permanently stops the loop, and restart policy belongs to
/// whatever supervises the process. In dummy mode the collaborator is never
/// called; the cycle is treated as signaled once the probes pass.
pub struct HeartbeatController<'a> {
    config: &'a Config,
    probes: ProbeSet,
    monitor: &'a dyn AppMonitor,
}

impl<'a> HeartbeatController<'a> {
    /// Controller over the given probe set and signaling capability.
    pub fn new(config: &'a Config, probes: ProbeSet, monitor: &'a dyn AppMonitor) -> Self {
        Self {
            config,
            probes,
            monitor,
        }
    }

    /// Run cycles until one fails, then hand back the terminating failure.
    ///
    /// This never completes successfully: a healthy guest keeps cycling
    /// until something stops confirming liveness or the process is killed.
    pub fn run(&self) -> GhbError {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            debug!(cycle, "starting probe cycle");
            if let Err(failure) = self.run_cycle() {
                return failure;
            }
            debug!(
                seconds = self.config.interval.as_secs(),
                "sleeping until the next cycle"
            );
            thread::sleep(self.config.interval);
        }
    }

    /// One cycle: every probe in order, then the liveness signal.
    fn run_cycle(&self) -> Result<()> {
        self.probes.run_all()?;
        self.signal()
    }

    fn signal(&self) -> Result<()> {
        if self.config.dummy {
            debug!("dummy mode: heartbeat treated as sent");
            return Ok(());
        }
        self.monitor.mark_active()?;
        debug!("heartbeat sent successfully");
        Ok(())
    }
}
