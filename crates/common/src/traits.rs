//! Core traits for reachscan components

use crate::types::{Endpoint, ProbeOutcome, ScanOptions};
use async_trait::async_trait;

/// Reachability prober - one bounded connect attempt per endpoint.
///
/// Implementations never fail: every error path becomes a failed
/// `ProbeOutcome`, so the coordinator can count outcomes against endpoints.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single endpoint
    async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome;

    /// Prober name/identifier
    fn name(&self) -> &str;

    /// Options this prober was tuned for
    fn recommended_options(&self) -> ScanOptions {
        ScanOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    struct MockProber;

    #[async_trait]
    impl Prober for MockProber {
        async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome {
            ProbeOutcome::connected(*endpoint)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_prober_trait() {
        let prober = MockProber;
        let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);

        let outcome = prober.probe(&endpoint).await;
        assert!(outcome.success);
        assert_eq!(outcome.address, "127.0.0.1:80");
        assert_eq!(prober.recommended_options().default_port, 443);
    }
}
