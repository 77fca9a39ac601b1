//! Shell-command probe: liveness is a zero exit status.

use std::process::Command;

use tracing::debug;

use super::Probe;
use crate::core::errors::{GhbError, Result};

/// Runs a shell command synchronously once per cycle.
///
/// The guest counts as alive iff the command exits zero. Output is not
/// captured; only the status matters. There is no timeout: the cycle blocks
/// until the child finishes.
pub struct CommandProbe {
    command: String,
}

impl CommandProbe {
    /// Probe for the given `sh -c` command line.
    #[must_use]
    pub const fn new(command: String) -> Self {
        Self { command }
    }
}

impl Probe for CommandProbe {
    fn name(&self) -> &'static str {
        "system"
    }

    fn run(&self) -> Result<()> {
        debug!(command = %self.command, "testing via shell command");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .status()
            .map_err(|source| GhbError::CommandProbe {
                command: self.command.clone(),
                status: format!("spawn failure: {source}"),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GhbError::CommandProbe {
                command: self.command.clone(),
                status: status.to_string(),
            })
        }
    }
}
