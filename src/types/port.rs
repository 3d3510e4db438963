//! Port types with validation.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` and `PortSelection` describe which ports a scan covers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A validated network port number (1-65535).
///
/// Port 0 is never a valid scan target, so an absent port must be modelled
/// with `Option<Port>` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port list")]
    Empty,
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Every valid port, 1-65535.
    pub const FULL: Self = Self {
        start: Port(Port::MIN),
        end: Port(Port::MAX),
    };

    /// Create a new port range from raw bounds.
    pub fn new(start: u16, end: u16) -> Result<Self, PortError> {
        let start_port = Port::try_from(start)?;
        let end_port = Port::try_from(end)?;
        if start > end {
            return Err(PortError::InvalidRange(start, end));
        }
        Ok(Self {
            start: start_port,
            end: end_port,
        })
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Which ports a scan should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelection {
    /// One port.
    Single(Port),
    /// A contiguous inclusive range.
    Range(PortRange),
    /// The full 1-65535 space.
    All,
    /// An explicit list, scanned in the order given.
    List(Vec<Port>),
}

impl PortSelection {
    pub fn single(port: u16) -> Result<Self, PortError> {
        Ok(Self::Single(Port::try_from(port)?))
    }

    pub fn range(start: u16, end: u16) -> Result<Self, PortError> {
        Ok(Self::Range(PortRange::new(start, end)?))
    }

    pub fn list(ports: &[u16]) -> Result<Self, PortError> {
        if ports.is_empty() {
            return Err(PortError::Empty);
        }
        let ports = ports
            .iter()
            .map(|&p| Port::try_from(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::List(ports))
    }

    /// Expand into the dispatch order: first appearance wins, duplicates dropped.
    pub fn to_ports(&self) -> Vec<Port> {
        match self {
            Self::Single(port) => vec![*port],
            Self::Range(range) => range.iter().collect(),
            Self::All => PortRange::FULL.iter().collect(),
            Self::List(ports) => {
                let mut seen = HashSet::with_capacity(ports.len());
                ports.iter().copied().filter(|p| seen.insert(*p)).collect()
            }
        }
    }
}

impl fmt::Display for PortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(port) => write!(f, "port {}", port),
            Self::Range(range) => write!(f, "ports {}", range),
            Self::All => write!(f, "all ports"),
            Self::List(ports) => {
                let parts: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
                write!(f, "ports {}", parts.join(","))
            }
        }
    }
}
