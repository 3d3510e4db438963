//! Core type definitions using newtype patterns for type safety.
//!
//! These types reject invalid input (port 0, inverted ranges, empty lists)
//! at construction, so the engine only ever sees validated targets.

mod port;
mod scan_id;
mod target;

pub use port::{Port, PortError, PortRange, PortSelection};
pub use scan_id::ScanId;
pub use target::{ScanTarget, TargetError};
