//! Scanner module - the concurrent scan engine.
//!
//! Leaves first: [`probe`] makes one connect attempt, [`retry`] drives it to a
//! terminal outcome, [`engine`] runs the worker pool, and [`progress`] and
//! [`aggregator`] collect what the workers produce.

pub mod aggregator;
pub mod engine;
pub mod probe;
pub mod progress;
pub mod resolver;
pub mod retry;

#[cfg(test)]
mod testing;

use crate::types::Port;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use aggregator::{ResultAggregator, ScanReport, ScanStatus};
pub use engine::Scanner;
pub use probe::{ConnectOutcome, Probe, TcpConnectProbe};
pub use progress::ProgressReporter;
pub use resolver::HostResolver;
pub use retry::RetryPolicy;

/// Reachability of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortState {
    /// The TCP handshake completed.
    Open,
    /// The host actively refused the connection.
    Closed,
    /// No definitive answer: retries exhausted, host unreachable, or host unresolved.
    Unreachable,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Terminal result for one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOutcome {
    /// The port number that was scanned.
    pub port: Port,
    /// State determined by the scan.
    pub state: PortState,
    /// Service name, present only for open ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Connect attempts made. Zero when the port was never dispatched.
    pub attempts: u32,
}

impl PortOutcome {
    pub fn open(port: Port, service: impl Into<String>, attempts: u32) -> Self {
        Self {
            port,
            state: PortState::Open,
            service: Some(service.into()),
            attempts,
        }
    }

    pub fn closed(port: Port, attempts: u32) -> Self {
        Self {
            port,
            state: PortState::Closed,
            service: None,
            attempts,
        }
    }

    pub fn unreachable(port: Port, attempts: u32) -> Self {
        Self {
            port,
            state: PortState::Unreachable,
            service: None,
            attempts,
        }
    }

    /// Outcome for a port the scan never got to.
    pub fn not_attempted(port: Port) -> Self {
        Self::unreachable(port, 0)
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_state_display() {
        assert_eq!(PortState::Open.to_string(), "open");
        assert_eq!(PortState::Closed.to_string(), "closed");
        assert_eq!(PortState::Unreachable.to_string(), "unreachable");
    }

    #[test]
    fn test_service_only_on_open() {
        let port = Port::new(22).unwrap();
        assert_eq!(PortOutcome::open(port, "SSH", 1).service.as_deref(), Some("SSH"));
        assert!(PortOutcome::closed(port, 1).service.is_none());
        assert!(PortOutcome::unreachable(port, 3).service.is_none());
        assert_eq!(PortOutcome::not_attempted(port).attempts, 0);
    }

    #[test]
    fn test_outcome_serialization() {
        let port = Port::new(80).unwrap();
        let json = serde_json::to_string(&PortOutcome::open(port, "HTTP", 2)).unwrap();
        assert_eq!(
            json,
            r#"{"port":80,"state":"OPEN","service":"HTTP","attempts":2}"#
        );

        let json = serde_json::to_string(&PortOutcome::closed(port, 1)).unwrap();
        assert!(!json.contains("service"));
    }
}
