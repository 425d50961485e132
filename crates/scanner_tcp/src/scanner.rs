// crates/scanner_tcp/src/scanner.rs
//! TCP connect prober implementation

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, instrument};

use reachscan_common::{
    classify, AddressFamily, ConnectFailure, Endpoint, ProbeOutcome, Prober, ScanOptions,
    DEFAULT_CONNECT_TIMEOUT,
};

/// Single-attempt TCP connect prober.
///
/// A probe opens one socket, waits at most `timeout` for the handshake and
/// closes the socket again before returning. No bytes are exchanged.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    /// Create a new prober with the default 3 second deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Open a socket of the endpoint's family and connect it within the deadline.
    async fn try_connect(&self, endpoint: &Endpoint) -> Result<TcpStream, ConnectFailure> {
        let socket = match endpoint.family() {
            AddressFamily::V4 => TcpSocket::new_v4()?,
            AddressFamily::V6 => TcpSocket::new_v6()?,
        };

        match timeout(self.timeout, socket.connect(endpoint.socket_addr())).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ConnectFailure::Io(e)),
            Err(_) => Err(ConnectFailure::DeadlineExceeded),
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    #[instrument(skip_all, fields(endpoint = %endpoint, family = endpoint.family().as_str()))]
    async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome {
        let start = Instant::now();

        match self.try_connect(endpoint).await {
            Ok(stream) => {
                let rtt = start.elapsed();
                drop(stream);
                debug!(?rtt, "connected");
                ProbeOutcome::connected(*endpoint).with_rtt(rtt)
            }
            Err(failure) => {
                let rtt = start.elapsed();
                let (category, message) = classify(&endpoint.to_string(), &failure);
                debug!(%category, ?rtt, "connect failed");
                ProbeOutcome::failed(*endpoint, category, message).with_rtt(rtt)
            }
        }
    }

    fn name(&self) -> &str {
        "TCP Connect Prober"
    }

    fn recommended_options(&self) -> ScanOptions {
        ScanOptions::audit().with_connect_timeout(self.timeout)
    }
}
