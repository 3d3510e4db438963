//! portprobe binary entry point.

use anyhow::{Context, Result};
use clap::Parser;
use portprobe::cli::Cli;
use portprobe::config::AppSettings;
use portprobe::logging::LogHandle;
use portprobe::output::{self, OutputFormat};
use portprobe::scanner::{ProgressReporter, ScanStatus, Scanner};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_HOST_UNRESOLVED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            // Parse failures are invalid input, not clap's default exit code.
            let _ = e.print();
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        Err(e) => e.exit(),
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(EXIT_INVALID_INPUT)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let (settings, settings_error) = AppSettings::load_or_default(cli.config.as_deref());
    let (logging, log_error) = LogHandle::install(&cli.log_options(&settings));
    if let Some(e) = log_error {
        warn!(error = %e, "file logging disabled");
        if !cli.quiet {
            output::print_warning(&format!("{}; logging to console only", e));
        }
    }
    if let Some(e) = settings_error {
        warn!(error = %e, "using default settings");
        if !cli.quiet {
            output::print_warning(&format!("{}; using defaults", e));
        }
    }

    let target = cli.target().context("invalid port selection")?;
    let config = cli.scan_config(&settings);
    config.validate().context("invalid scan configuration")?;

    let progress = if cli.show_progress() {
        ProgressReporter::with_bar()
    } else {
        ProgressReporter::hidden()
    };
    let scanner = Scanner::tcp(config)
        .with_progress(progress)
        .with_dispatch(logging.dispatch());

    if !cli.quiet && cli.output == OutputFormat::Plain {
        output::print_scan_header(
            target.host(),
            target.port_count(),
            scanner.config().concurrency.min(target.port_count()),
        );
    }

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nScan interrupted, finishing in-flight probes...");
            cancel_for_signal.cancel();
        }
    });

    let report = scanner.run(&target, cancel).await?;

    output::print_report(&report, cli.output, cli.show_closed)
        .context("failed to write results")?;

    let code = match &report.status {
        ScanStatus::Completed => ExitCode::SUCCESS,
        ScanStatus::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
        ScanStatus::HostUnresolved { reason } => {
            if !cli.quiet {
                output::print_error(&format!("could not resolve {}: {}", report.host, reason));
            }
            ExitCode::from(EXIT_HOST_UNRESOLVED)
        }
    };

    if let Some(path) = logging.log_path() {
        if !cli.quiet && cli.output == OutputFormat::Plain {
            output::print_info(&format!("Log written to {}", path.display()));
        }
    }

    Ok(code)
}
