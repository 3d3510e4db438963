//! # portprobe - A Concurrent TCP Connect Port Scanner
//!
//! portprobe checks which TCP ports on a single host accept connections.
//! Ports are probed by a fixed pool of workers, silent ports are retried a
//! bounded number of times, and every port ends up in exactly one outcome.
//!
//! ## Features
//!
//! - **Bounded Concurrency**: At most `concurrency` connect attempts in flight
//! - **Bounded Retries**: Timeouts are retried with a fixed or exponential backoff
//! - **Deterministic Reports**: Outcomes sorted by port, whatever the completion order
//! - **Cancellation**: Ctrl-C yields a partial report instead of nothing
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use portprobe::config::ScanConfig;
//! use portprobe::scanner::Scanner;
//! use portprobe::types::{PortSelection, ScanTarget};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = ScanTarget::new("127.0.0.1", &PortSelection::range(20, 25)?)?;
//!     let scanner = Scanner::tcp(ScanConfig::default());
//!
//!     let report = scanner.run(&target, CancellationToken::new()).await?;
//!     for outcome in report.open_ports() {
//!         println!("{} open ({})", outcome.port, outcome.service.as_deref().unwrap_or("?"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port selections and scan targets
//! - [`scanner`] - Probe, retry policy, worker pool and result aggregation
//! - [`services`] - Well-known port to service name table
//! - [`config`] - Engine configuration and the JSON settings file
//! - [`logging`] - Console and file log layers
//! - [`output`] - Report formatting
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{ProbeError, ScanError};
pub use scanner::{PortOutcome, PortState, ScanReport, ScanStatus, Scanner};
pub use services::ServiceTable;
pub use types::{Port, PortSelection, ScanTarget};
