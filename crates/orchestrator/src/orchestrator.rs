// crates/orchestrator/src/orchestrator.rs
//! Scan coordination - record expansion, probe fan-out and outcome fan-in

use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use reachscan_common::{
    classify, ConnectFailure, Endpoint, ProbeOutcome, Prober, ReachError, ReachResult,
    ScanOptions, ScanRecord,
};
use reachscan_target_resolver::{PortSetExpander, TargetExpander};

use crate::progress::ProgressTracker;

/// Expands records into endpoints, probes each on its own task and merges
/// every outcome into one stream.
pub struct ScanCoordinator {
    prober: Arc<dyn Prober>,
    options: ScanOptions,
    targets: TargetExpander,
    ports: PortSetExpander,
    progress: Arc<ProgressTracker>,
}

impl ScanCoordinator {
    /// Create a coordinator around `prober`. Fails on invalid options.
    pub fn new(prober: Arc<dyn Prober>, options: ScanOptions) -> ReachResult<Self> {
        options.validate()?;
        Ok(Self {
            targets: TargetExpander::new().with_max_block_size(options.max_block_size),
            ports: PortSetExpander::new(options.default_port),
            prober,
            options,
            progress: Arc::new(ProgressTracker::new()),
        })
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn progress(&self) -> Arc<ProgressTracker> {
        self.progress.clone()
    }

    /// Start scanning `records` and return the outcome stream.
    ///
    /// Outcomes arrive in completion order. The stream ends once every
    /// dispatched probe, across all records, has reported. Must be called
    /// from within a Tokio runtime.
    pub fn run(&self, records: Vec<ScanRecord>) -> OutcomeStream {
        let run_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher {
            prober: self.prober.clone(),
            targets: self.targets,
            ports: self.ports,
            limiter: self
                .options
                .max_concurrency
                .map(|limit| Arc::new(Semaphore::new(limit))),
            progress: self.progress.clone(),
            tx,
        };

        info!(%run_id, prober = self.prober.name(), records = records.len(), "starting scan");
        tokio::spawn(
            dispatcher
                .dispatch(records)
                .instrument(info_span!("scan", %run_id)),
        );

        OutcomeStream { run_id, rx }
    }
}

/// Receiving end of a scan. Closed once the last probe has reported.
pub struct OutcomeStream {
    run_id: Uuid,
    rx: mpsc::UnboundedReceiver<ProbeOutcome>,
}

impl OutcomeStream {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Next outcome, or `None` once the scan has finished.
    pub async fn next(&mut self) -> Option<ProbeOutcome> {
        self.rx.recv().await
    }

    /// Drain the whole stream.
    pub async fn collect(mut self) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Owns the stream's original sender; each probe task holds a clone, so the
/// channel closes exactly when dispatch and all probes are done.
struct Dispatcher {
    prober: Arc<dyn Prober>,
    targets: TargetExpander,
    ports: PortSetExpander,
    limiter: Option<Arc<Semaphore>>,
    progress: Arc<ProgressTracker>,
    tx: mpsc::UnboundedSender<ProbeOutcome>,
}

impl Dispatcher {
    async fn dispatch(self, records: Vec<ScanRecord>) {
        for record in records {
            self.progress.record_seen();
            self.dispatch_record(record).await;
        }
        info!(
            outcomes = self.progress.dispatched(),
            in_flight = self.progress.in_flight(),
            "dispatch finished"
        );
    }

    async fn dispatch_record(&self, record: ScanRecord) {
        let addrs = match self.targets.expand(&record.target).await {
            Ok(addrs) => addrs,
            Err(e) => {
                warn!(line = record.line, spec = %record.target, error = %e, "target expansion failed");
                self.emit(ProbeOutcome::unprobed(record.target.as_str(), &e));
                return;
            }
        };

        let ports = self.ports.expand(&record.ports);
        debug!(
            line = record.line,
            addresses = addrs.len(),
            ports = ports.len(),
            "expanded record"
        );

        for ip in addrs {
            for port in &ports {
                match port {
                    Ok(port) => self.spawn_probe(Endpoint::new(ip, *port)).await,
                    Err(e) => {
                        warn!(line = record.line, %ip, error = %e, "skipping malformed port");
                        self.emit(ProbeOutcome::unprobed(unparsed_address(ip, e), e));
                    }
                }
            }
        }
    }

    /// Report an outcome that never needed a probe task.
    fn emit(&self, outcome: ProbeOutcome) {
        self.progress.dispatched_one();
        self.progress.completed_one(outcome.success);
        // Receiver gone means the consumer stopped listening; nothing to do.
        let _ = self.tx.send(outcome);
    }

    async fn spawn_probe(&self, endpoint: Endpoint) {
        // Waiting here keeps at most `limit` probe tasks alive at once.
        let permit = match &self.limiter {
            Some(limiter) => limiter.clone().acquire_owned().await.ok(),
            None => None,
        };

        self.progress.dispatched_one();
        let prober = self.prober.clone();
        let progress = self.progress.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = probe_isolated(prober, endpoint).await;
            drop(permit);
            progress.completed_one(outcome.success);
            if tx.send(outcome).is_err() {
                debug!(%endpoint, "outcome stream closed by consumer");
            }
        });
    }
}

/// Run one probe on its own task so a panicking prober still yields an outcome.
async fn probe_isolated(prober: Arc<dyn Prober>, endpoint: Endpoint) -> ProbeOutcome {
    match tokio::spawn(async move { prober.probe(&endpoint).await }).await {
        Ok(outcome) => outcome,
        Err(join) => {
            let failure = ConnectFailure::Other(join.to_string());
            let (category, message) = classify(&endpoint.to_string(), &failure);
            ProbeOutcome::failed(endpoint, category, message)
        }
    }
}

/// `ip:token` for a port token that did not parse, bracketing IPv6.
fn unparsed_address(ip: IpAddr, err: &ReachError) -> String {
    let token = match err {
        ReachError::PortParse(raw) => raw.as_str(),
        _ => "",
    };
    match ip {
        IpAddr::V4(v4) => format!("{v4}:{token}"),
        IpAddr::V6(v6) => format!("[{v6}]:{token}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn unparsed_address_brackets_ipv6() {
        let err = ReachError::PortParse("http".into());
        assert_eq!(
            unparsed_address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), &err),
            "10.0.0.1:http"
        );
        assert_eq!(
            unparsed_address(IpAddr::V6(Ipv6Addr::LOCALHOST), &err),
            "[::1]:http"
        );
    }
}
