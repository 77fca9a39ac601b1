//! Shared helpers for integration tests: spawn and supervise the compiled
//! `ghb` binary.

use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

/// Collected result of a finished or stopped daemon run.
pub struct DaemonRun {
    /// Exit status if the process ended on its own within the deadline.
    pub status: Option<ExitStatus>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr (diagnostics land here).
    pub stderr: String,
}

/// Command for the compiled binary with the given arguments.
pub fn ghb_command(args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ghb"));
    command.args(args);
    command
}

/// Run to completion and return the raw output. For invocations that are
/// expected to exit promptly on their own (help, bad flags, startup errors).
pub fn run_ghb(args: &[&str]) -> Output {
    ghb_command(args)
        .output()
        .expect("ghb binary should spawn")
}

/// Spawn the daemon with piped streams.
pub fn spawn_ghb(args: &[&str]) -> Child {
    ghb_command(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("ghb binary should spawn")
}

/// Wait up to `deadline` for the child to exit on its own, then kill it
/// either way and collect its output.
pub fn supervise(mut child: Child, deadline: Duration) -> DaemonRun {
    let started = Instant::now();
    let mut status = None;
    while started.elapsed() < deadline {
        match child.try_wait().expect("try_wait should not fail") {
            Some(exit) => {
                status = Some(exit);
                break;
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    }
    if status.is_none() {
        let _ = child.kill();
    }
    let output = child
        .wait_with_output()
        .expect("collecting child output should not fail");
    DaemonRun {
        status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Number of times `needle` occurs in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
