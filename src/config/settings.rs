//! Application settings loaded from an optional JSON file.
//!
//! Every option is optional. A missing or malformed file yields the defaults;
//! the caller decides how to report the problem.

use super::scan::{Backoff, ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES};
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portprobe)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform configuration directory. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("", "", "portprobe").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Severity threshold for the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "WARN")]
    Warning,
    Error,
}

impl LogLevel {
    /// Equivalent `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

/// Settings recognized in the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Log file path; `null` disables the log file.
    pub log_filename: Option<PathBuf>,
    /// Minimum severity written to the log file.
    pub log_level: LogLevel,
    /// Connect timeout per attempt, in seconds.
    pub timeout: u64,
    /// Attempts per silent port.
    pub max_retries: u32,
    /// Worker pool size.
    pub workers: usize,
    /// Delay between attempts, in seconds.
    pub retry_backoff: u64,
    /// Backoff growth strategy.
    pub backoff: Backoff,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_filename: Some(PathBuf::from("portprobe.log")),
            log_level: LogLevel::Info,
            timeout: 1,
            max_retries: DEFAULT_MAX_RETRIES,
            workers: DEFAULT_CONCURRENCY,
            retry_backoff: 1,
            backoff: Backoff::Fixed,
        }
    }
}

impl AppSettings {
    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load settings, falling back to defaults on any problem.
    ///
    /// With an explicit path, a missing file is reported. Without one, the
    /// default location is tried and silently skipped when absent.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        let file = match path {
            Some(path) => path.to_path_buf(),
            None => match Paths::discover() {
                Ok(paths) => paths.settings_file(),
                Err(_) => return (Self::default(), None),
            },
        };

        if path.is_none() && !file.exists() {
            return (Self::default(), None);
        }

        match Self::load_from(&file) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Engine configuration derived from these settings.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(self.max_retries)
            .with_retry_backoff(Duration::from_secs(self.retry_backoff))
            .with_backoff(self.backoff)
            .with_concurrency(self.workers)
    }
}
