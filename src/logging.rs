//! Logging setup.
//!
//! Two `tracing-subscriber` layers: a console layer on stderr whose filter is
//! driven by `-v`/`-q` (or `RUST_LOG`), and an optional plain-text file layer
//! writing `<timestamp> - <LEVEL> - <message>` lines.

use crate::config::LogLevel;
use crate::error::{ConfigError, ConfigResult};
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// What to log and where.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Only errors on the console.
    pub quiet: bool,
    /// Log file; `None` disables file logging.
    pub file: Option<PathBuf>,
    /// Minimum severity written to the file.
    pub file_level: LogLevel,
}

impl LogOptions {
    fn console_filter(&self) -> EnvFilter {
        if self.quiet {
            return EnvFilter::new("error");
        }
        let level = match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={}", CRATE_TARGET, level)))
    }
}

/// Owns the configured subscriber. Dropping it flushes the log file.
pub struct LogHandle {
    dispatch: Dispatch,
    file: Option<SharedFile>,
    path: Option<PathBuf>,
}

impl LogHandle {
    /// Build the subscriber without installing it.
    pub fn build(options: &LogOptions) -> ConfigResult<Self> {
        let file = options.file.as_deref().map(SharedFile::open).transpose()?;
        Ok(Self::assemble(options, file))
    }

    /// Like [`LogHandle::build`], but an unopenable log file only disables
    /// the file layer. The open error is handed back for the caller to report.
    pub fn build_or_console(options: &LogOptions) -> (Self, Option<ConfigError>) {
        match Self::build(options) {
            Ok(handle) => (handle, None),
            Err(e) => {
                let console_only = LogOptions {
                    file: None,
                    ..options.clone()
                };
                (Self::assemble(&console_only, None), Some(e))
            }
        }
    }

    /// Build the subscriber and make it the process-wide default.
    pub fn install(options: &LogOptions) -> (Self, Option<ConfigError>) {
        let (handle, error) = Self::build_or_console(options);
        if tracing::dispatcher::set_global_default(handle.dispatch.clone()).is_err() {
            tracing::debug!("global subscriber already set");
        }
        (handle, error)
    }

    fn assemble(options: &LogOptions, file: Option<SharedFile>) -> Self {
        let console = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_filter(options.console_filter());

        let file_layer = file.clone().map(|writer| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(PlainLine)
                .with_writer(writer)
                .with_filter(
                    Targets::new().with_target(CRATE_TARGET, options.file_level.as_tracing()),
                )
        });

        let subscriber = tracing_subscriber::registry().with(console).with(file_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
            path: file.as_ref().and(options.file.clone()),
            file,
        }
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn flush(&self) -> io::Result<()> {
        match &self.file {
            Some(file) => file.clone().flush(),
            None => Ok(()),
        }
    }
}

impl Drop for LogHandle {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("failed to flush log file: {}", e);
        }
    }
}

/// Buffered log file shared between the layer and the handle.
#[derive(Clone)]
struct SharedFile(Arc<Mutex<BufWriter<File>>>);

impl SharedFile {
    fn open(path: &Path) -> ConfigResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ConfigError::LogFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self(Arc::new(Mutex::new(BufWriter::new(file)))))
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, BufWriter<File>>> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }
}

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// `2026-01-31 12:00:00,123 - INFO - message key=value`
struct PlainLine;

impl<S, N> FormatEvent<S, N> for PlainLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = match *event.metadata().level() {
            Level::WARN => "WARNING",
            other => other.as_str(),
        };
        write!(
            writer,
            "{} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_options(dir: &TempDir, level: LogLevel) -> LogOptions {
        LogOptions {
            quiet: true,
            file: Some(dir.path().join("scan.log")),
            file_level: level,
            ..LogOptions::default()
        }
    }

    #[test]
    fn test_file_line_format() {
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::build(&file_options(&dir, LogLevel::Info)).unwrap();
        tracing::dispatcher::with_default(&handle.dispatch(), || {
            tracing::info!("scan finished");
            tracing::warn!("config missing");
        });
        let path = handle.log_path().unwrap().to_path_buf();
        drop(handle);

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - INFO - scan finished"), "{}", lines[0]);
        assert!(lines[1].contains(" - WARNING - config missing"));
        // Timestamp prefix: "YYYY-MM-DD HH:MM:SS,mmm"
        assert_eq!(lines[0].find(" - "), Some(23));
    }

    #[test]
    fn test_file_level_threshold() {
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::build(&file_options(&dir, LogLevel::Warning)).unwrap();
        tracing::dispatcher::with_default(&handle.dispatch(), || {
            tracing::debug!("noise");
            tracing::info!("more noise");
            tracing::error!(port = 22, "kept");
        });
        handle.flush().unwrap();

        let content = fs::read_to_string(handle.log_path().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(" - ERROR - kept port=22"));
    }

    #[test]
    fn test_unwritable_log_path() {
        let dir = TempDir::new().unwrap();
        let options = LogOptions {
            file: Some(dir.path().join("missing").join("scan.log")),
            ..LogOptions::default()
        };
        assert!(matches!(
            LogHandle::build(&options),
            Err(ConfigError::LogFile { .. })
        ));
    }

    #[test]
    fn test_unwritable_log_path_falls_back_to_console() {
        let dir = TempDir::new().unwrap();
        let options = LogOptions {
            quiet: true,
            file: Some(dir.path().join("missing").join("scan.log")),
            ..LogOptions::default()
        };
        let (handle, error) = LogHandle::build_or_console(&options);

        assert!(matches!(error, Some(ConfigError::LogFile { .. })));
        assert!(handle.log_path().is_none());
        tracing::dispatcher::with_default(&handle.dispatch(), || {
            tracing::error!("still logging");
        });
        assert!(handle.flush().is_ok());
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_writable_log_path_keeps_file() {
        let dir = TempDir::new().unwrap();
        let (handle, error) = LogHandle::build_or_console(&file_options(&dir, LogLevel::Info));
        assert!(error.is_none());
        assert_eq!(handle.log_path(), Some(dir.path().join("scan.log").as_path()));
    }

    #[test]
    fn test_no_file_configured() {
        let handle = LogHandle::build(&LogOptions::default()).unwrap();
        assert!(handle.log_path().is_none());
        assert!(handle.flush().is_ok());
    }
}
