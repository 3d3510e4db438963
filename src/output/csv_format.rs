//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write one row per port: `port,state,service,attempts`.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "state", "service", "attempts"])?;

    for outcome in &report.outcomes {
        wtr.write_record([
            &outcome.port.to_string(),
            &outcome.state.to_string(),
            outcome.service.as_deref().unwrap_or(""),
            &outcome.attempts.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_report;

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "port,state,service,attempts",
                "22,open,SSH,1",
                "23,closed,,1",
                "8080,unreachable,,3",
            ]
        );
    }
}
