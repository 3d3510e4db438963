//! Configuration management for portprobe.
//!
//! `ScanConfig` is the immutable engine configuration; `AppSettings` is the
//! optional JSON settings file it can be derived from.

mod scan;
mod settings;

pub use scan::{
    Backoff, ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF,
    DEFAULT_TIMEOUT,
};
pub use settings::{AppSettings, LogLevel, Paths};
