//! Scan target: one host plus the ordered ports to probe on it.

use super::port::{Port, PortError, PortSelection};
use serde::Serialize;
use std::fmt;

/// A validated scan target.
///
/// The port list is non-empty, duplicate-free, and kept in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTarget {
    host: String,
    ports: Vec<Port>,
}

impl ScanTarget {
    /// Build a target from a host and a port selection.
    pub fn new(host: impl Into<String>, selection: &PortSelection) -> Result<Self, TargetError> {
        Self::from_ports(host, selection.to_ports())
    }

    /// Build a target from an already expanded port list.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn from_ports(host: impl Into<String>, ports: Vec<Port>) -> Result<Self, TargetError> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if ports.is_empty() {
            return Err(TargetError::Ports(PortError::Empty));
        }

        let mut seen = std::collections::HashSet::with_capacity(ports.len());
        let ports = ports.into_iter().filter(|p| seen.insert(*p)).collect();

        Ok(Self { host, ports })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Ports in dispatch order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ports)", self.host, self.ports.len())
    }
}

/// Error type for target validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error(transparent)]
    Ports(#[from] PortError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_target_from_range() {
        let selection = PortSelection::range(20, 25).unwrap();
        let target = ScanTarget::new("10.0.0.1", &selection).unwrap();
        assert_eq!(target.host(), "10.0.0.1");
        assert_eq!(target.port_count(), 6);
        assert_eq!(target.ports()[0], port(20));
    }

    #[test]
    fn test_host_trimmed_and_required() {
        let selection = PortSelection::single(22).unwrap();
        assert_eq!(
            ScanTarget::new("   ", &selection),
            Err(TargetError::EmptyHost)
        );
        let target = ScanTarget::new(" example.com ", &selection).unwrap();
        assert_eq!(target.host(), "example.com");
    }

    #[test]
    fn test_from_ports_dedups_in_order() {
        let target =
            ScanTarget::from_ports("host", vec![port(9999), port(22), port(9999), port(80)])
                .unwrap();
        assert_eq!(target.ports(), &[port(9999), port(22), port(80)]);
    }

    #[test]
    fn test_empty_ports_rejected() {
        assert_eq!(
            ScanTarget::from_ports("host", Vec::new()),
            Err(TargetError::Ports(PortError::Empty))
        );
    }
}
