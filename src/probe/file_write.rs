//! Filesystem probe: create, write, and delete a scratch file.

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;

use tracing::debug;

use super::Probe;
use crate::core::errors::{GhbError, Result};

/// Proves the filesystem is writable by round-tripping a scratch file at a
/// fixed path.
///
/// A path that already exists fails the probe without being touched: a
/// leftover scratch file means an earlier instance died mid-probe or the
/// operator pointed two instances at the same path, and either situation
/// should surface rather than be clobbered.
pub struct FileWriteProbe {
    path: PathBuf,
}

impl FileWriteProbe {
    /// Probe for the given scratch path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Probe for FileWriteProbe {
    fn name(&self) -> &'static str {
        "fopen"
    }

    fn run(&self) -> Result<()> {
        debug!(path = %self.path.display(), "testing via file write");

        if self.path.exists() {
            debug!("scratch file already exists; check the location or remove it and restart");
            return Err(GhbError::FileWriteClobber {
                path: self.path.clone(),
            });
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|source| GhbError::FileWriteProbe {
                path: self.path.clone(),
                source,
            })?;

        // A timestamp payload: if deletion fails and the file lingers, it
        // records when the probe that created it ran.
        let stamp = chrono::Utc::now().to_rfc3339();
        file.write_all(stamp.as_bytes())
            .map_err(|source| GhbError::FileWriteProbe {
                path: self.path.clone(),
                source,
            })?;
        drop(file);

        fs::remove_file(&self.path).map_err(|source| GhbError::FileWriteProbe {
            path: self.path.clone(),
            source,
        })
    }
}
