//! GHB-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, GhbError>;

/// Top-level error type for Guest Heartbeat Helper.
///
/// Startup failures (GHB-1xxx, GHB-2001, GHB-4001) abort before the loop
/// begins; probe and signal failures (GHB-3xxx, GHB-2002) stop the loop.
/// Nothing is retried anywhere: restart policy belongs to the supervisor.
#[derive(Debug, Error)]
pub enum GhbError {
    #[error("[GHB-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[GHB-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[GHB-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[GHB-2001] app monitoring unavailable: {details}")]
    CapabilityUnavailable { details: String },

    #[error("[GHB-2002] heartbeat not accepted by the host: {details}")]
    SignalFailure { details: String },

    #[error("[GHB-3001] command probe failed: `{command}` finished with {status}")]
    CommandProbe { command: String, status: String },

    #[error("[GHB-3002] file-write probe refused: {path} already exists")]
    FileWriteClobber { path: PathBuf },

    #[error("[GHB-3003] file-write probe failed at {path}: {source}")]
    FileWriteProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[GHB-3004] connect probe failed for {target}: {details}")]
    ConnectProbe { target: String, details: String },

    #[error("[GHB-3005] ping probe could not open a raw ICMP socket: {details}")]
    PingPrivilege { details: String },

    #[error("[GHB-3006] ping probe cannot resolve {host}: {details}")]
    PingResolve { host: String, details: String },

    #[error("[GHB-3007] ping probe got no usable echo reply from {host}: {details}")]
    PingProbe { host: String, details: String },

    #[error("[GHB-4001] failed to detach into the background: {details}")]
    DetachFailed { details: String },
}

impl GhbError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "GHB-1001",
            Self::MissingConfig { .. } => "GHB-1002",
            Self::ConfigParse { .. } => "GHB-1003",
            Self::CapabilityUnavailable { .. } => "GHB-2001",
            Self::SignalFailure { .. } => "GHB-2002",
            Self::CommandProbe { .. } => "GHB-3001",
            Self::FileWriteClobber { .. } => "GHB-3002",
            Self::FileWriteProbe { .. } => "GHB-3003",
            Self::ConnectProbe { .. } => "GHB-3004",
            Self::PingPrivilege { .. } => "GHB-3005",
            Self::PingResolve { .. } => "GHB-3006",
            Self::PingProbe { .. } => "GHB-3007",
            Self::DetachFailed { .. } => "GHB-4001",
        }
    }

    /// Whether this failure came out of a liveness probe (as opposed to
    /// configuration, signaling, or process plumbing).
    #[must_use]
    pub const fn is_probe(&self) -> bool {
        matches!(
            self,
            Self::CommandProbe { .. }
                | Self::FileWriteClobber { .. }
                | Self::FileWriteProbe { .. }
                | Self::ConnectProbe { .. }
                | Self::PingPrivilege { .. }
                | Self::PingResolve { .. }
                | Self::PingProbe { .. }
        )
    }
}

impl From<toml::de::Error> for GhbError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
