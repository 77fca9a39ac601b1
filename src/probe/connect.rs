//! TCP connect probe with a bounded timeout.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs as _};
use std::time::Duration;

use tracing::debug;

use super::Probe;
use crate::core::errors::{GhbError, Result};

/// Attempts a TCP connection to `host:port` once per cycle.
///
/// The attempt is bounded by its own timeout, independent of the cycle
/// interval. The target is resolved on every run so the probe follows DNS
/// changes; an unresolvable or malformed target is a per-cycle failure, not
/// a startup error. The socket is dropped before the probe returns on both
/// paths.
pub struct ConnectProbe {
    target: String,
    timeout: Duration,
}

impl ConnectProbe {
    /// Probe for the given `host:port` with the given connect timeout.
    #[must_use]
    pub const fn new(target: String, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    fn resolve(&self) -> Result<SocketAddr> {
        let mut addrs = self
            .target
            .to_socket_addrs()
            .map_err(|source| GhbError::ConnectProbe {
                target: self.target.clone(),
                details: format!("cannot resolve: {source}"),
            })?;
        addrs.next().ok_or_else(|| GhbError::ConnectProbe {
            target: self.target.clone(),
            details: "resolved to no addresses".to_string(),
        })
    }
}

impl Probe for ConnectProbe {
    fn name(&self) -> &'static str {
        "connect"
    }

    fn run(&self) -> Result<()> {
        debug!(target = %self.target, "testing via tcp connect");
        let addr = self.resolve()?;
        let stream =
            TcpStream::connect_timeout(&addr, self.timeout).map_err(|source| {
                GhbError::ConnectProbe {
                    target: self.target.clone(),
                    details: source.to_string(),
                }
            })?;
        // Connection established is all the proof needed; release the socket.
        drop(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectProbe;
    use crate::probe::Probe;
    use std::net::TcpListener;
    use std::time::{Duration, Instant};

    #[test]
    fn reachable_listener_passes() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");

        let probe = ConnectProbe::new(addr.to_string(), Duration::from_secs(1));
        assert!(probe.run().is_ok());
    }

    #[test]
    fn unreachable_port_fails_within_the_timeout_window() {
        // Port 1 on loopback: nothing listens, the connect is refused or
        // times out, and either way the probe must come back promptly.
        let timeout = Duration::from_secs(1);
        let probe = ConnectProbe::new("127.0.0.1:1".to_string(), timeout);

        let started = Instant::now();
        let result = probe.run();
        let elapsed = started.elapsed();

        assert!(result.is_err());
        assert!(
            elapsed < timeout + Duration::from_secs(2),
            "probe took {elapsed:?}, expected roughly the {timeout:?} timeout"
        );
    }

    #[test]
    fn malformed_target_is_a_probe_failure() {
        let probe = ConnectProbe::new("no-port-here".to_string(), Duration::from_secs(1));
        let error = probe.run().expect_err("malformed target must fail");
        assert_eq!(error.code(), "GHB-3004");
    }
}
