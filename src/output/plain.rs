//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{PortState, ScanReport, ScanStatus};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write the report as a table. Closed and unreachable ports are listed only
/// when `show_closed` is set.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport, show_closed: bool) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                   {} Scan Results",
        style("portprobe").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Host:").bold(), report.host)?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(report.id.short()).dim()
    )?;
    let status = match &report.status {
        ScanStatus::Completed => style(report.status.to_string()).green(),
        ScanStatus::Interrupted => style(report.status.to_string()).yellow(),
        ScanStatus::HostUnresolved { .. } => style(report.status.to_string()).red(),
    };
    writeln!(out, "  {} {}", style("Status:").bold(), status)?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s",
        style("Statistics:").bold(),
        report.outcomes.len(),
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} unreachable",
        style(report.count(PortState::Open)).green().bold(),
        style(report.count(PortState::Closed)).red(),
        style(report.count(PortState::Unreachable)).yellow()
    )?;
    writeln!(out)?;

    let shown: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| show_closed || o.is_open())
        .collect();

    if shown.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^12}  {:<15}  {:>8}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("ATTEMPTS").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for outcome in &shown {
            let state_style = match outcome.state {
                PortState::Open => Style::new().green().bold(),
                PortState::Closed => Style::new().red(),
                PortState::Unreachable => Style::new().yellow(),
            };
            let service = outcome
                .service
                .as_deref()
                .map(|s| truncate_string(s, 15))
                .unwrap_or_default();

            writeln!(
                out,
                "  {:>6}  {:^12}  {:<15}  {:>8}",
                outcome.port,
                state_style.apply_to(outcome.state.to_string()),
                service,
                outcome.attempts
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    let hidden = report.outcomes.len() - shown.len();
    if hidden > 0 {
        writeln!(
            out,
            "  {}",
            style(format!(
                "{} closed or unreachable ports hidden (use --show-closed)",
                hidden
            ))
            .dim()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(host: &str, ports: usize, workers: usize) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portprobe").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(
        "{} Target: {}",
        style("•").dim(),
        style(host).white().bold()
    );
    eprintln!(
        "{} Scanning {} ports with {} workers...",
        style("•").dim(),
        style(ports).white().bold(),
        workers
    );
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_report;

    fn has_row(text: &str, port: &str) -> bool {
        text.lines().any(|l| l.trim_start().starts_with(port))
    }

    fn render(show_closed: bool) -> String {
        let mut buf = Vec::new();
        write_plain(&mut buf, &sample_report(), show_closed).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_hides_closed_by_default() {
        let text = render(false);
        assert!(text.contains("Host: 127.0.0.1"));
        assert!(has_row(&text, "22 "));
        assert!(text.contains("SSH"));
        assert!(!has_row(&text, "23 "));
        assert!(!has_row(&text, "8080 "));
        assert!(text.contains("2 closed or unreachable ports hidden"));
        assert!(text.contains("1 open, 1 closed, 1 unreachable"));
    }

    #[test]
    fn test_show_closed_lists_every_port() {
        let text = render(true);
        assert!(text.contains("ATTEMPTS"));
        assert!(has_row(&text, "23 "));
        assert!(has_row(&text, "8080 "));
        assert!(!text.contains("hidden"));
    }
}
