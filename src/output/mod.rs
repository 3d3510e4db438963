//! Output formatting module.
//!
//! Renders a [`ScanReport`] as a plain text table, JSON, or CSV.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_info, print_scan_header, print_warning, write_plain};

use crate::scanner::ScanReport;
use clap::ValueEnum;
use std::fmt;
use std::io::{self, Write};

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Plain,
    /// JSON report
    Json,
    /// One CSV row per port
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Render `report` into `out`.
///
/// `show_closed` only affects the plain table; JSON and CSV always carry
/// every port.
pub fn render<W: Write>(
    out: &mut W,
    report: &ScanReport,
    format: OutputFormat,
    show_closed: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report, show_closed),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}

/// Render `report` to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat, show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, report, format, show_closed)?;
    out.flush()
}
