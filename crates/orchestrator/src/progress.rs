//! Progress tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Counts endpoints dispatched against outcomes delivered.
///
/// The scan is complete once dispatch has finished and `completed` has
/// caught up with `dispatched`.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    records: AtomicUsize,
    dispatched: AtomicUsize,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_seen(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispatched_one(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed_one(&self, success: bool) {
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Release);
    }

    pub fn records(&self) -> usize {
        self.records.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Outcomes still owed to the stream.
    pub fn in_flight(&self) -> usize {
        self.dispatched().saturating_sub(self.completed())
    }

    pub fn print_summary(&self) {
        let dispatched = self.dispatched();
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        info!("Scan Summary:");
        info!("  Records: {}", self.records());
        info!("  Outcomes: {}", dispatched);
        info!("  Reachable: {}", succeeded);
        info!("  Failed: {}", failed);
        if dispatched > 0 {
            info!(
                "  Success rate: {:.1}%",
                (succeeded as f64 / dispatched as f64) * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_in_flight() {
        let p = ProgressTracker::new();
        p.record_seen();
        p.dispatched_one();
        p.dispatched_one();
        assert_eq!(p.in_flight(), 2);

        p.completed_one(true);
        p.completed_one(false);
        assert_eq!(p.in_flight(), 0);
        assert_eq!(p.completed(), 2);
        assert_eq!(p.records(), 1);
    }
}
