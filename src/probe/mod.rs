//! Liveness probes and the ordered set that runs them each cycle.
//!
//! A probe proves one independent dimension of guest health. Probes are
//! constructed from configuration once at startup; a probe whose target was
//! never configured is absent from the set, not a failure. The set runs in a
//! fixed order and stops at the first failure, since nothing later in the
//! cycle can change the outcome.

pub mod command;
pub mod connect;
pub mod file_write;
pub mod ping;

pub use command::CommandProbe;
pub use connect::ConnectProbe;
pub use file_write::FileWriteProbe;
pub use ping::PingProbe;

use tracing::debug;

use crate::core::config::Config;
use crate::core::errors::Result;

/// A single liveness check.
///
/// Implementations must release every resource they acquire (sockets, file
/// handles, child processes) before returning, on success and failure alike.
pub trait Probe {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Run the check once. `Ok(())` means this dimension is alive.
    fn run(&self) -> Result<()>;
}

/// Ordered collection of the probes enabled by configuration.
pub struct ProbeSet {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeSet {
    /// An empty set. Running it always passes.
    #[must_use]
    pub const fn empty() -> Self {
        Self { probes: Vec::new() }
    }

    /// Build the set in its fixed order: command, file-write, connect, ping.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut set = Self::empty();
        if let Some(command) = &config.test_system {
            set.push(Box::new(CommandProbe::new(command.clone())));
        }
        if let Some(path) = &config.test_fopen {
            set.push(Box::new(FileWriteProbe::new(path.clone())));
        }
        if let Some(target) = &config.test_connect {
            set.push(Box::new(ConnectProbe::new(
                target.clone(),
                config.connect_timeout,
            )));
        }
        if let Some(host) = &config.test_ping {
            set.push(Box::new(PingProbe::new(host.clone())));
        }
        set
    }

    /// Append a probe. New probe kinds slot in without touching the set.
    pub fn push(&mut self, probe: Box<dyn Probe>) {
        self.probes.push(probe);
    }

    /// Number of enabled probes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether no probe is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Names of the enabled probes, in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    /// Run every probe in order, returning the first failure immediately.
    /// Probes after a failure are skipped.
    pub fn run_all(&self) -> Result<()> {
        for probe in &self.probes {
            debug!(probe = probe.name(), "running liveness probe");
            probe.run()?;
            debug!(probe = probe.name(), "probe passed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Probe, ProbeSet};
    use crate::core::config::Config;
    use crate::core::errors::{GhbError, Result};
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::Duration;

    struct ScriptedProbe {
        runs: Rc<Cell<usize>>,
        fail: bool,
    }

    impl ScriptedProbe {
        fn new(runs: Rc<Cell<usize>>, fail: bool) -> Self {
            Self { runs, fail }
        }
    }

    impl Probe for ScriptedProbe {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn run(&self) -> Result<()> {
            self.runs.set(self.runs.get() + 1);
            if self.fail {
                Err(GhbError::CommandProbe {
                    command: "scripted".to_string(),
                    status: "exit status: 1".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn bare_config() -> Config {
        Config {
            dummy: true,
            verbose: false,
            foreground: true,
            interval: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(1),
            monitor_program: PathBuf::from("vmware-appmonitor"),
            test_system: None,
            test_fopen: None,
            test_connect: None,
            test_ping: None,
        }
    }

    #[test]
    fn unconfigured_probes_are_absent_not_failing() {
        let set = ProbeSet::from_config(&bare_config());
        assert!(set.is_empty());
        assert!(set.run_all().is_ok(), "an empty set must pass");
    }

    #[test]
    fn configured_probes_appear_in_fixed_order() {
        let config = Config {
            test_system: Some("true".to_string()),
            test_fopen: Some(PathBuf::from("/tmp/ghb.scratch")),
            test_connect: Some("localhost:22".to_string()),
            test_ping: Some("localhost".to_string()),
            ..bare_config()
        };
        let set = ProbeSet::from_config(&config);
        assert_eq!(set.names(), vec!["system", "fopen", "connect", "ping"]);
    }

    #[test]
    fn partial_configuration_keeps_relative_order() {
        let config = Config {
            test_connect: Some("localhost:22".to_string()),
            test_ping: Some("localhost".to_string()),
            ..bare_config()
        };
        let set = ProbeSet::from_config(&config);
        assert_eq!(set.names(), vec!["connect", "ping"]);
    }

    #[test]
    fn first_failure_short_circuits_the_rest() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut set = ProbeSet::empty();
        set.push(Box::new(ScriptedProbe::new(Rc::clone(&first), true)));
        set.push(Box::new(ScriptedProbe::new(Rc::clone(&second), false)));

        let result = set.run_all();
        assert!(result.is_err());
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0, "probes after a failure must not run");
    }

    #[test]
    fn all_probes_run_when_all_pass() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut set = ProbeSet::empty();
        set.push(Box::new(ScriptedProbe::new(Rc::clone(&first), false)));
        set.push(Box::new(ScriptedProbe::new(Rc::clone(&second), false)));

        assert!(set.run_all().is_ok());
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
    }
}
