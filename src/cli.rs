//! Command-line interface definitions for portprobe.
//!
//! Uses `clap` derive macros for declarative argument parsing. Exactly one
//! port mode is required: `-s`, `-r`, `-a` or `-l`.

use crate::config::{AppSettings, Backoff, ScanConfig};
use crate::logging::LogOptions;
use crate::output::OutputFormat;
use crate::types::{PortError, PortSelection, ScanTarget, TargetError};
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "portprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect port scanner", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["single", "range", "all", "list"])
))]
pub struct Cli {
    /// Target hostname or IP address
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Scan a single port
    #[arg(short = 's', long = "single", value_name = "PORT")]
    pub single: Option<u16>,

    /// Scan an inclusive range of ports
    #[arg(short = 'r', long = "range", num_args = 2, value_names = ["START", "END"])]
    pub range: Option<Vec<u16>>,

    /// Scan every port from 1 to 65535
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Scan a list of ports
    #[arg(short = 'l', long = "list", num_args = 1.., value_name = "PORT")]
    pub list: Option<Vec<u16>>,

    /// Connection timeout per attempt, in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent workers
    #[arg(short = 'w', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Maximum connect attempts for a port that never answers
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Delay between attempts, in seconds
    #[arg(long, value_name = "SECS")]
    pub retry_backoff: Option<u64>,

    /// Double the retry delay after each attempt
    #[arg(long)]
    pub exponential_backoff: bool,

    /// Path to a JSON settings file
    #[arg(long, value_name = "PATH", env = "PORTPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Show closed and unreachable ports in plain output
    #[arg(long)]
    pub show_closed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The port mode chosen on the command line.
    pub fn selection(&self) -> Result<PortSelection, PortError> {
        if let Some(port) = self.single {
            return PortSelection::single(port);
        }
        if let Some(range) = &self.range {
            return match range.as_slice() {
                [start, end] => PortSelection::range(*start, *end),
                _ => Err(PortError::Empty),
            };
        }
        if let Some(list) = &self.list {
            return PortSelection::list(list);
        }
        if self.all {
            return Ok(PortSelection::All);
        }
        Err(PortError::Empty)
    }

    pub fn target(&self) -> Result<ScanTarget, TargetError> {
        ScanTarget::new(self.host.as_str(), &self.selection()?)
    }

    /// Engine configuration: settings file values overridden by flags.
    pub fn scan_config(&self, settings: &AppSettings) -> ScanConfig {
        let mut config = settings.scan_config();
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(workers) = self.workers {
            config = config.with_concurrency(workers);
        }
        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }
        if let Some(secs) = self.retry_backoff {
            config = config.with_retry_backoff(Duration::from_secs(secs));
        }
        if self.exponential_backoff {
            config = config.with_backoff(Backoff::Exponential);
        }
        config
    }

    pub fn log_options(&self, settings: &AppSettings) -> LogOptions {
        LogOptions {
            verbosity: self.verbose,
            quiet: self.quiet,
            file: settings.log_filename.clone(),
            file_level: settings.log_level,
        }
    }

    /// Whether to draw a progress bar.
    pub fn show_progress(&self) -> bool {
        self.verbose > 0 && !self.quiet && console::Term::stderr().is_term()
    }
}
