//! Result aggregation and the final scan report.
//!
//! Outcomes arrive in completion order. The aggregator keys them by port, so
//! the report comes out ascending regardless of which worker finished first.

use crate::error::{ScanError, ScanResult};
use crate::scanner::{PortOutcome, PortState};
use crate::types::{Port, ScanId, ScanTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tokio::time::Instant;

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanStatus {
    /// Every port reached a terminal outcome.
    Completed,
    /// Stopped by an external request; only finished ports are reported.
    Interrupted,
    /// The host name could not be resolved; unstarted ports have zero attempts.
    HostUnresolved { reason: String },
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::HostUnresolved { reason } => write!(f, "host unresolved ({})", reason),
        }
    }
}

/// Complete, immutable result of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier for this scan.
    pub id: ScanId,
    /// Host as given by the caller.
    pub host: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// One entry per port, ascending by port.
    pub outcomes: Vec<PortOutcome>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Completed
    }

    /// Number of outcomes in the given state.
    pub fn count(&self, state: PortState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortOutcome> {
        self.outcomes.iter().filter(|o| o.is_open())
    }

    /// Look up the outcome for one port.
    pub fn outcome(&self, port: Port) -> Option<&PortOutcome> {
        self.outcomes
            .binary_search_by_key(&port, |o| o.port)
            .ok()
            .map(|i| &self.outcomes[i])
    }

    /// One-line summary suitable for a log file.
    pub fn summary(&self) -> String {
        let open: Vec<String> = self.open_ports().map(|o| o.port.to_string()).collect();
        let open = if open.is_empty() {
            "none".to_string()
        } else {
            open.join(", ")
        };
        format!(
            "Scan {} of {} {}: {} ports, {} open, {} closed, {} unreachable [{:.2}s]; open ports: {}",
            self.id.short(),
            self.host,
            self.status,
            self.outcomes.len(),
            self.count(PortState::Open),
            self.count(PortState::Closed),
            self.count(PortState::Unreachable),
            self.duration_ms as f64 / 1000.0,
            open
        )
    }
}

/// Collects per-port outcomes for one scan. Each port is written exactly once.
#[derive(Debug)]
pub struct ResultAggregator {
    id: ScanId,
    host: String,
    expected: Vec<Port>,
    allowed: HashSet<Port>,
    outcomes: BTreeMap<Port, PortOutcome>,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl ResultAggregator {
    pub fn new(target: &ScanTarget) -> Self {
        Self {
            id: ScanId::new(),
            host: target.host().to_string(),
            expected: target.ports().to_vec(),
            allowed: target.ports().iter().copied().collect(),
            outcomes: BTreeMap::new(),
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    pub fn id(&self) -> ScanId {
        self.id
    }

    /// Store the outcome for a port. A second outcome for the same port is rejected.
    pub fn record(&mut self, outcome: PortOutcome) -> ScanResult<()> {
        if !self.allowed.contains(&outcome.port) {
            return Err(ScanError::UnexpectedPort(outcome.port));
        }
        if self.outcomes.contains_key(&outcome.port) {
            return Err(ScanError::DuplicateOutcome(outcome.port));
        }
        self.outcomes.insert(outcome.port, outcome);
        Ok(())
    }

    /// Number of ports recorded so far.
    pub fn recorded(&self) -> usize {
        self.outcomes.len()
    }

    /// Ports of the target that have no outcome yet, in dispatch order.
    pub fn missing(&self) -> impl Iterator<Item = Port> + '_ {
        self.expected
            .iter()
            .copied()
            .filter(|p| !self.outcomes.contains_key(p))
    }

    /// Seal the report.
    ///
    /// On a host resolution failure every missing port is filled in as
    /// unreachable with zero attempts. An interrupted scan reports only the
    /// ports that finished.
    pub fn finalize(mut self, status: ScanStatus) -> ScanReport {
        if matches!(status, ScanStatus::HostUnresolved { .. }) {
            let missing: Vec<Port> = self.missing().collect();
            for port in missing {
                self.outcomes.insert(port, PortOutcome::not_attempted(port));
            }
        }

        ScanReport {
            id: self.id,
            host: self.host,
            status,
            started_at: self.started_at,
            completed_at: Utc::now(),
            duration_ms: self.clock.elapsed().as_millis() as u64,
            outcomes: self.outcomes.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    fn target(ports: &[u16]) -> ScanTarget {
        ScanTarget::from_ports("10.0.0.5", ports.iter().map(|&p| port(p)).collect()).unwrap()
    }

    #[test]
    fn test_finalize_sorts_by_port() {
        let mut aggregator = ResultAggregator::new(&target(&[9999, 22, 80]));
        aggregator.record(PortOutcome::closed(port(9999), 1)).unwrap();
        aggregator.record(PortOutcome::open(port(80), "HTTP", 1)).unwrap();
        aggregator.record(PortOutcome::open(port(22), "SSH", 1)).unwrap();

        let report = aggregator.finalize(ScanStatus::Completed);
        let ports: Vec<u16> = report.outcomes.iter().map(|o| o.port.as_u16()).collect();
        assert_eq!(ports, vec![22, 80, 9999]);
        assert!(report.is_complete());
        assert_eq!(report.count(PortState::Open), 2);
        assert_eq!(report.outcome(port(80)).and_then(|o| o.service.as_deref()), Some("HTTP"));
    }

    #[test]
    fn test_duplicate_rejected_without_overwrite() {
        let mut aggregator = ResultAggregator::new(&target(&[22]));
        aggregator.record(PortOutcome::open(port(22), "SSH", 1)).unwrap();
        let err = aggregator
            .record(PortOutcome::closed(port(22), 1))
            .unwrap_err();
        assert!(matches!(err, ScanError::DuplicateOutcome(p) if p == port(22)));

        let report = aggregator.finalize(ScanStatus::Completed);
        assert_eq!(report.outcomes, vec![PortOutcome::open(port(22), "SSH", 1)]);
    }

    #[test]
    fn test_foreign_port_rejected() {
        let mut aggregator = ResultAggregator::new(&target(&[22]));
        assert!(matches!(
            aggregator.record(PortOutcome::closed(port(23), 1)),
            Err(ScanError::UnexpectedPort(_))
        ));
    }

    #[test]
    fn test_host_unresolved_fills_missing() {
        let mut aggregator = ResultAggregator::new(&target(&[1, 2, 3]));
        aggregator.record(PortOutcome::unreachable(port(2), 1)).unwrap();
        assert_eq!(aggregator.missing().count(), 2);

        let report = aggregator.finalize(ScanStatus::HostUnresolved {
            reason: "NXDOMAIN".to_string(),
        });
        let attempts: Vec<u32> = report.outcomes.iter().map(|o| o.attempts).collect();
        assert_eq!(attempts, vec![0, 1, 0]);
        assert_eq!(report.count(PortState::Unreachable), 3);
    }

    #[test]
    fn test_interrupted_keeps_partial() {
        let mut aggregator = ResultAggregator::new(&target(&[1, 2, 3]));
        aggregator.record(PortOutcome::closed(port(3), 1)).unwrap();
        let report = aggregator.finalize(ScanStatus::Interrupted);
        assert_eq!(report.outcomes.len(), 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_summary_lists_open_ports() {
        let mut aggregator = ResultAggregator::new(&target(&[22, 80]));
        aggregator.record(PortOutcome::open(port(80), "HTTP", 1)).unwrap();
        aggregator.record(PortOutcome::closed(port(22), 1)).unwrap();
        let summary = aggregator.finalize(ScanStatus::Completed).summary();
        assert!(summary.contains("10.0.0.5"));
        assert!(summary.contains("1 open, 1 closed, 0 unreachable"));
        assert!(summary.ends_with("open ports: 80"));
    }

    #[test]
    fn test_report_json_shape() {
        let mut aggregator = ResultAggregator::new(&target(&[443]));
        aggregator.record(PortOutcome::open(port(443), "HTTPS", 1)).unwrap();
        let report = aggregator.finalize(ScanStatus::Completed);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"]["kind"], "completed");
        assert_eq!(value["outcomes"][0]["port"], 443);
        assert_eq!(value["outcomes"][0]["service"], "HTTPS");
    }
}
