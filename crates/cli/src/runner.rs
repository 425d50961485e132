// runner.rs
use anyhow::{Context, Result};
use std::{io, path::Path, sync::Arc, time::{Duration, Instant}};
use tracing::info;
use reachscan_common::{Prober, ScanOptions, ScanStats};
use reachscan_orchestrator::ScanCoordinator;
use reachscan_scanner_tcp::TcpProber;

use crate::input::load_records;
use crate::output::{OutcomeWriter, OutputFormat};

/// Load `input`, probe every endpoint it describes and stream one line per
/// outcome to stdout. Input errors abort before any probe is dispatched.
pub async fn run_check(
    input: &Path,
    concurrency: Option<usize>,
    timeout: u64,
    max_block_size: u128,
    output_format: &str,
) -> Result<ScanStats> {
    let loaded = load_records(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    let prober = TcpProber::new().with_timeout(Duration::from_millis(timeout));
    let tuned = prober.recommended_options();
    let options = match concurrency {
        Some(limit) => ScanOptions::bounded(limit).with_connect_timeout(tuned.connect_timeout),
        None => tuned,
    }
    .with_max_block_size(max_block_size);

    let coordinator =
        ScanCoordinator::new(Arc::new(prober), options).context("Invalid scan configuration")?;
    let options = coordinator.options();

    info!("Input: {}", input.display());
    info!("Records: {} ({} skipped)", loaded.records.len(), loaded.skipped.len());
    match options.max_concurrency {
        Some(limit) => info!("Concurrency: {}", limit),
        None => info!("Concurrency: unbounded"),
    }
    info!("Connect timeout: {:?}", options.connect_timeout);

    let mut writer = OutcomeWriter::new(OutputFormat::parse(output_format), io::stdout());
    for skipped in &loaded.skipped {
        writer.write_skip(skipped)?;
    }

    let scan_start = Instant::now();
    let mut stream = coordinator.run(loaded.records);
    info!("Run id: {}", stream.run_id());
    let mut stats = ScanStats::new();
    while let Some(outcome) = stream.next().await {
        stats.update(&outcome);
        writer.write_outcome(&outcome)?;
    }
    stats.elapsed = scan_start.elapsed();

    coordinator.progress().print_summary();
    writer.write_summary(&stats)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_run_check_against_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ip,port").unwrap();
        writeln!(file, "127.0.0.1,{open}").unwrap();
        writeln!(file, ",443").unwrap();
        writeln!(file, "10.0.0.0/40,443").unwrap();

        let stats = run_check(file.path(), Some(8), 1000, 65536, "text")
            .await
            .unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.unprobed, 1);
    }

    #[tokio::test]
    async fn test_missing_input_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_check(&dir.path().join("data.csv"), None, 1000, 65536, "text")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read input file"));
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ip,port").unwrap();
        assert!(run_check(file.path(), Some(0), 1000, 65536, "text").await.is_err());
    }
}
