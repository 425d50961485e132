//! Output formatting for probe outcomes
//!
//! Lines are written as outcomes arrive, so each write is flushed.

use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use reachscan_common::{ErrorCategory, ProbeOutcome, ScanStats};

use crate::input::SkippedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Normalize a format name, falling back to text for unknown values.
    pub fn parse(format: &str) -> Self {
        match format.trim().to_lowercase().as_str() {
            "json" | "j" => OutputFormat::Json,
            "csv" | "c" => OutputFormat::Csv,
            "text" | "t" | "" => OutputFormat::Text,
            other => {
                tracing::warn!("Unknown format '{}', using text", other);
                OutputFormat::Text
            }
        }
    }
}

/// Streams outcomes to `out` in the chosen format.
pub struct OutcomeWriter<W: Write> {
    format: OutputFormat,
    out: W,
    csv_header_written: bool,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out,
            csv_header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Visible notice for an input row that was not scanned.
    pub fn write_skip(&mut self, skipped: &SkippedRow) -> Result<()> {
        let notice = format!(
            "⚠️ Skipping record {} due to {}",
            skipped.line, skipped.reason
        );
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{notice}")?,
            // keep machine-readable stdout clean
            OutputFormat::Json | OutputFormat::Csv => eprintln!("{notice}"),
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn write_outcome(&mut self, outcome: &ProbeOutcome) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", render_line(outcome))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, outcome)?;
                writeln!(self.out)?;
            }
            OutputFormat::Csv => self.write_csv_row(outcome)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_csv_row(&mut self, outcome: &ProbeOutcome) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.out);
        if !self.csv_header_written {
            wtr.write_record(["address", "success", "category", "rtt_ms", "message"])?;
            self.csv_header_written = true;
        }
        let category = outcome.category.map(|c| c.as_str()).unwrap_or("");
        let rtt_ms = outcome.rtt.as_millis().to_string();
        wtr.write_record([
            outcome.address.as_str(),
            if outcome.success { "true" } else { "false" },
            category,
            rtt_ms.as_str(),
            outcome.message.as_str(),
        ])?;
        wtr.flush()?;
        Ok(())
    }

    /// End-of-run summary; only text output carries it.
    pub fn write_summary(&mut self, stats: &ScanStats) -> Result<()> {
        if self.format != OutputFormat::Text {
            return Ok(());
        }
        writeln!(self.out)?;
        writeln!(self.out, "📊 Summary:")?;
        writeln!(self.out, "  Total checked: {}", stats.total)?;
        writeln!(self.out, "  ✅ Reachable: {}", stats.succeeded)?;
        writeln!(self.out, "  ⏳ Timeouts: {}", stats.timeouts)?;
        writeln!(self.out, "  🛑 Refused: {}", stats.refused)?;
        writeln!(self.out, "  🤷 Unreachable: {}", stats.unreachable)?;
        // unprobed outcomes are filed under the generic category
        let other = (stats.system_errors + stats.operation_errors + stats.generic_errors)
            .saturating_sub(stats.unprobed);
        writeln!(self.out, "  ❌ Other errors: {}", other)?;
        writeln!(self.out, "  ⚠️ Not probed: {}", stats.unprobed)?;
        writeln!(self.out, "  ⏱️  Scan duration: {}", format_duration(stats.elapsed))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Status indicator for an outcome.
fn indicator(outcome: &ProbeOutcome) -> &'static str {
    if outcome.success {
        return "✅";
    }
    if !outcome.was_probed() {
        return "⚠️";
    }
    match outcome.category {
        Some(ErrorCategory::Timeout) => "⏳",
        Some(ErrorCategory::ConnectionRefused) => "🛑",
        Some(ErrorCategory::NetworkUnreachable) => "🤷",
        _ => "❌",
    }
}

/// One human-readable line: indicator, address and classification message.
pub fn render_line(outcome: &ProbeOutcome) -> String {
    if outcome.message.contains(&outcome.address) {
        format!("{} {}", indicator(outcome), outcome.message)
    } else {
        format!("{} {}: {}", indicator(outcome), outcome.address, outcome.message)
    }
}

/// Format duration in a human-readable way
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reachscan_common::{Endpoint, ReachError};
    use std::net::{IpAddr, Ipv4Addr};

    fn endpoint() -> Endpoint {
        Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 443)
    }

    fn refused() -> ProbeOutcome {
        ProbeOutcome::failed(
            endpoint(),
            ErrorCategory::ConnectionRefused,
            "connection refused by 10.0.0.1:443".into(),
        )
    }

    fn written(writer: OutcomeWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_render_lines() {
        assert_eq!(
            render_line(&ProbeOutcome::connected(endpoint())),
            "✅ connected to 10.0.0.1:443"
        );
        assert_eq!(render_line(&refused()), "🛑 connection refused by 10.0.0.1:443");

        let timeout = ProbeOutcome::failed(
            endpoint(),
            ErrorCategory::Timeout,
            "connection timeout to 10.0.0.1:443".into(),
        );
        assert!(render_line(&timeout).starts_with("⏳ "));

        let bad_port = ProbeOutcome::unprobed("10.0.0.1:web", &ReachError::PortParse("web".into()));
        assert_eq!(render_line(&bad_port), "⚠️ 10.0.0.1:web: invalid port \"web\"");
    }

    #[test]
    fn test_text_output_with_skip_notice() {
        let mut w = OutcomeWriter::new(OutputFormat::Text, Vec::new());
        w.write_skip(&SkippedRow { line: 4, reason: "missing target" }).unwrap();
        w.write_outcome(&refused()).unwrap();

        let out = written(w);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "⚠️ Skipping record 4 due to missing target");
        assert_eq!(lines[1], "🛑 connection refused by 10.0.0.1:443");
    }

    #[test]
    fn test_json_lines() {
        let mut w = OutcomeWriter::new(OutputFormat::Json, Vec::new());
        w.write_outcome(&refused()).unwrap();
        w.write_outcome(&ProbeOutcome::connected(endpoint())).unwrap();

        let out = written(w);
        let rows: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["category"], "connection_refused");
        assert_eq!(rows[0]["success"], false);
        assert_eq!(rows[1]["address"], "10.0.0.1:443");
    }

    #[test]
    fn test_csv_rows_share_one_header() {
        let mut w = OutcomeWriter::new(OutputFormat::Csv, Vec::new());
        w.write_outcome(&refused()).unwrap();
        w.write_outcome(&ProbeOutcome::connected(endpoint())).unwrap();

        let out = written(w);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "address,success,category,rtt_ms,message");
        assert_eq!(
            lines[1],
            "10.0.0.1:443,false,connection_refused,0,connection refused by 10.0.0.1:443"
        );
        assert!(lines[2].starts_with("10.0.0.1:443,true,,"));
    }

    #[test]
    fn test_summary_only_in_text() {
        let mut stats = ScanStats::new();
        stats.update(&refused());

        let mut w = OutcomeWriter::new(OutputFormat::Json, Vec::new());
        w.write_summary(&stats).unwrap();
        assert!(written(w).is_empty());

        let mut w = OutcomeWriter::new(OutputFormat::Text, Vec::new());
        w.write_summary(&stats).unwrap();
        let out = written(w);
        assert!(out.contains("Total checked: 1"));
        assert!(out.contains("🛑 Refused: 1"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse(" csv "), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_millis(5500)), "5.500s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
    }
}
