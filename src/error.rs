//! Error types for portprobe.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port failures are
//! modelled by [`ProbeError`] and never escape the engine; only validation
//! problems surface as [`ScanError`].

use crate::types::{Port, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single connect attempt.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    TimedOut,

    #[error("failed to resolve host '{host}': {reason}")]
    ResolutionFailed { host: String, reason: String },

    #[error("host unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
}

impl ProbeError {
    /// Whether another attempt could produce a different answer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Whether the failure applies to every port on the host.
    pub fn is_host_wide(&self) -> bool {
        matches!(self, Self::ResolutionFailed { .. })
    }
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid config format: {0}")]
    InvalidFormat(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("worker count must be at least 1")]
    ZeroConcurrency,

    #[error("unknown log level '{0}' (expected DEBUG, INFO, WARNING or ERROR)")]
    UnknownLogLevel(String),

    #[error("failed to open log file {path}: {reason}")]
    LogFile { path: PathBuf, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that abort a scan before or during scheduling.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("outcome for port {0} was recorded twice")]
    DuplicateOutcome(Port),

    #[error("port {0} is not part of the scan target")]
    UnexpectedPort(Port),

    #[error("scan worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
