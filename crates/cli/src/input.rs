//! CSV input loading
//!
//! The first row is a header. Each data row carries a target and an
//! optional port spec; extra columns are ignored.

use reachscan_common::{PortSpec, ReachError, ReachResult, ScanRecord, TargetSpec};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// A data row that was not turned into a `ScanRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: &'static str,
}

#[derive(Debug, Default)]
pub struct LoadedInput {
    pub records: Vec<ScanRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Read every record from `path`. Any I/O or CSV error is fatal.
pub fn load_records(path: &Path) -> ReachResult<LoadedInput> {
    let file = File::open(path)?;
    let loaded = read_records(file)?;
    debug!(
        path = %path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped.len(),
        "loaded input"
    );
    Ok(loaded)
}

pub fn read_records<R: Read>(reader: R) -> ReachResult<LoadedInput> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut loaded = LoadedInput::default();
    for (idx, row) in rdr.records().enumerate() {
        let line = idx + 1;
        let row = row.map_err(|e| ReachError::Input(format!("malformed record {line}: {e}")))?;

        let target = row.get(0).unwrap_or_default();
        if target.is_empty() {
            warn!(line, "skipping record with missing target");
            loaded.skipped.push(SkippedRow {
                line,
                reason: "missing target",
            });
            continue;
        }
        let ports = row.get(1).unwrap_or_default();
        loaded.records.push(ScanRecord::new(
            line,
            TargetSpec::new(target),
            PortSpec::new(ports),
        ));
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_rows_after_header() {
        let data = "ip,port\n10.0.0.1,22\n10.0.0.0/30,80-8080\nexample.com,\n";
        let loaded = read_records(data.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 3);
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.records[0].line, 1);
        assert_eq!(loaded.records[0].target.as_str(), "10.0.0.1");
        assert_eq!(loaded.records[1].ports.as_str(), "80-8080");
        assert!(loaded.records[2].ports.is_empty());
    }

    #[test]
    fn test_missing_port_column_is_empty_spec() {
        let loaded = read_records("ip,port\n10.0.0.1\n".as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.records[0].ports.is_empty());
    }

    #[test]
    fn test_missing_target_is_skipped_with_notice() {
        let data = "ip,port\n,443\n10.0.0.2,443\n  ,22\n";
        let loaded = read_records(data.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].line, 2);
        assert_eq!(
            loaded.skipped,
            vec![
                SkippedRow { line: 1, reason: "missing target" },
                SkippedRow { line: 3, reason: "missing target" },
            ]
        );
    }

    #[test]
    fn test_header_only_file() {
        let loaded = read_records("ip,port\n".as_bytes()).unwrap();
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ip,port").unwrap();
        writeln!(file, "127.0.0.1,22").unwrap();
        writeln!(file, "::1,80-443").unwrap();

        let loaded = load_records(file.path()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].target.as_str(), "::1");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ReachError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let data: &[u8] = b"ip,port\n\xff\xfe,22\n";
        assert!(matches!(read_records(data), Err(ReachError::Input(_))));
    }
}
