//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the full report as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(out, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_report;

    #[test]
    fn test_json_carries_every_port() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["host"], "127.0.0.1");
        assert_eq!(value["status"]["kind"], "completed");
        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0]["state"], "OPEN");
        assert_eq!(outcomes[2]["attempts"], 3);
        assert!(outcomes[1].get("service").is_none());
    }
}
