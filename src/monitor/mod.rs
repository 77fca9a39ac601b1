//! Hypervisor application-monitor channel: enable once, mark active each cycle.
//!
//! The host side watches for heartbeats after `enable` and flags the guest as
//! unresponsive when they stop, so the only thing this module must get right
//! is to report success strictly when the host accepted the call. The
//! production channel shells out to the VMware Tools app-monitor utility;
//! the trait seam exists so the controller and lifecycle can be exercised
//! against recording fakes.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::core::errors::{GhbError, Result};

/// The liveness-signaling capability consumed by the heartbeat loop.
pub trait AppMonitor {
    /// Ask the host to start watching for heartbeats. Called once at startup;
    /// failure is terminal for the whole process.
    fn enable(&self) -> Result<()>;

    /// Report one healthy cycle. Called once per cycle in which every
    /// configured probe passed.
    fn mark_active(&self) -> Result<()>;
}

/// Channel backed by the VMware Tools app-monitor utility
/// (`vmware-appmonitor enable` / `vmware-appmonitor markActive`).
///
/// Success is a zero exit status; the utility's output is discarded since the
/// daemon's own streams may already be closed.
pub struct AppMonitorCommand {
    program: PathBuf,
}

impl AppMonitorCommand {
    /// Channel driven through the given program.
    #[must_use]
    pub const fn new(program: PathBuf) -> Self {
        Self { program }
    }

    fn invoke(&self, operation: &str) -> std::result::Result<(), String> {
        debug!(program = %self.program.display(), operation, "invoking app monitor");
        let status = Command::new(&self.program)
            .arg(operation)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| format!("{} {operation}: {source}", self.program.display()))?;

        if status.success() {
            Ok(())
        } else {
            Err(format!(
                "{} {operation} finished with {status}",
                self.program.display()
            ))
        }
    }
}

impl AppMonitor for AppMonitorCommand {
    fn enable(&self) -> Result<()> {
        self.invoke("enable")
            .map_err(|details| GhbError::CapabilityUnavailable { details })
    }

    fn mark_active(&self) -> Result<()> {
        self.invoke("markActive")
            .map_err(|details| GhbError::SignalFailure { details })
    }
}
