//! Core data types for reachscan
//!
//! - `TargetSpec` / `PortSpec`: raw tokens from one input record
//! - `Endpoint`: one concrete (address, port) pair
//! - `ProbeOutcome`: the single, terminal result for one endpoint
//! - `ScanOptions` / `ScanStats`: run tuning and incremental accounting
//!
//! Fields stay `pub` where the coordinator and renderers read them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::{ReachError, ReachResult};

/// Port probed when a record leaves its port field empty.
pub const DEFAULT_PORT: u16 = 443;

/// Deadline for a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Largest address block expanded without an explicit override (a /16).
pub const DEFAULT_MAX_BLOCK_SIZE: u128 = 1 << 16;

/// Transport family used for a connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "ipv4",
            AddressFamily::V6 => "ipv6",
        }
    }
}

/// Raw target token: an address literal, an address block, or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec(String);

impl TargetSpec {
    #[must_use]
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into().trim().to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw port token: empty, `"N"`, or `"A-B"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec(String);

impl PortSpec {
    #[must_use]
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into().trim().to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One input row: where to look and which ports to knock on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub target: TargetSpec,
    pub ports: PortSpec,
}

impl ScanRecord {
    #[must_use]
    pub fn new(line: usize, target: TargetSpec, ports: PortSpec) -> Self {
        Self {
            line,
            target,
            ports,
        }
    }
}

/// A concrete (address, port) pair ready to be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: u16,
}

impl Endpoint {
    #[inline]
    #[must_use]
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    #[inline]
    #[must_use]
    pub fn family(&self) -> AddressFamily {
        match self.ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    #[inline]
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for Endpoint {
    // SocketAddr brackets IPv6 literals, which keeps "host:port" unambiguous.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.socket_addr(), f)
    }
}

/// Closed set of connect failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Timeout,
    ConnectionRefused,
    NetworkUnreachable,
    SystemError,
    OperationError,
    Generic,
}

impl ErrorCategory {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::ConnectionRefused => "connection_refused",
            ErrorCategory::NetworkUnreachable => "network_unreachable",
            ErrorCategory::SystemError => "system_error",
            ErrorCategory::OperationError => "operation_error",
            ErrorCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing one endpoint, or of failing to produce endpoints for a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// `ip:port`, `[ipv6]:port`, or the raw target when expansion failed.
    pub address: String,
    /// Absent when no concrete endpoint could be built.
    pub endpoint: Option<Endpoint>,
    pub success: bool,
    pub category: Option<ErrorCategory>,
    pub message: String,
    /// Time spent in the connect call (zero when nothing was dialed).
    pub rtt: Duration,
    pub finished_at: DateTime<Utc>,
}

impl ProbeOutcome {
    /// Established connection to `endpoint`.
    #[must_use]
    pub fn connected(endpoint: Endpoint) -> Self {
        let address = endpoint.to_string();
        Self {
            message: format!("connected to {address}"),
            address,
            endpoint: Some(endpoint),
            success: true,
            category: None,
            rtt: Duration::ZERO,
            finished_at: Utc::now(),
        }
    }

    /// Classified connect failure for `endpoint`.
    #[must_use]
    pub fn failed(endpoint: Endpoint, category: ErrorCategory, message: String) -> Self {
        Self {
            address: endpoint.to_string(),
            endpoint: Some(endpoint),
            success: false,
            category: Some(category),
            message,
            rtt: Duration::ZERO,
            finished_at: Utc::now(),
        }
    }

    /// Failure raised before any socket was opened (bad target or bad port).
    #[must_use]
    pub fn unprobed<S: Into<String>>(address: S, error: &ReachError) -> Self {
        Self {
            address: address.into(),
            endpoint: None,
            success: false,
            category: Some(ErrorCategory::Generic),
            message: error.to_string(),
            rtt: Duration::ZERO,
            finished_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rtt(mut self, rtt: Duration) -> Self {
        self.rtt = rtt;
        self
    }

    /// True when a connect attempt was actually made.
    #[inline]
    #[must_use]
    pub const fn was_probed(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Scan behaviour tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    pub connect_timeout: Duration,
    /// `None` dispatches every endpoint at once.
    pub max_concurrency: Option<usize>,
    pub max_block_size: u128,
    pub default_port: u16,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::audit()
    }
}

impl ScanOptions {
    /// One task per endpoint, all in flight together.
    #[must_use]
    pub fn audit() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_concurrency: None,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            default_port: DEFAULT_PORT,
        }
    }

    /// Same as `audit` but with at most `limit` probes in flight.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self {
            max_concurrency: Some(limit),
            ..Self::audit()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_block_size(mut self, size: u128) -> Self {
        self.max_block_size = size;
        self
    }

    pub fn validate(&self) -> ReachResult<()> {
        if self.connect_timeout.is_zero() {
            return Err(ReachError::Config("connect timeout must be non-zero".into()));
        }
        if self.max_concurrency == Some(0) {
            return Err(ReachError::Config("concurrency limit must be at least 1".into()));
        }
        if self.max_block_size == 0 {
            return Err(ReachError::Config("block size limit must be at least 1".into()));
        }
        if self.default_port == 0 {
            return Err(ReachError::Config("default port must be in 1..=65535".into()));
        }
        Ok(())
    }
}

/// Run statistics collected as outcomes arrive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total: usize,
    pub succeeded: usize,
    pub timeouts: usize,
    pub refused: usize,
    pub unreachable: usize,
    pub system_errors: usize,
    pub operation_errors: usize,
    pub generic_errors: usize,
    /// Outcomes for which no connect was attempted.
    pub unprobed: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Success percentage in [0.0, 100.0].
    #[must_use]
    pub fn success_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f32 / self.total as f32) * 100.0
        }
    }

    pub fn update(&mut self, outcome: &ProbeOutcome) {
        self.total = self.total.saturating_add(1);
        if outcome.success {
            self.succeeded = self.succeeded.saturating_add(1);
            return;
        }
        if !outcome.was_probed() {
            self.unprobed = self.unprobed.saturating_add(1);
        }
        let slot = match outcome.category.unwrap_or(ErrorCategory::Generic) {
            ErrorCategory::Timeout => &mut self.timeouts,
            ErrorCategory::ConnectionRefused => &mut self.refused,
            ErrorCategory::NetworkUnreachable => &mut self.unreachable,
            ErrorCategory::SystemError => &mut self.system_errors,
            ErrorCategory::OperationError => &mut self.operation_errors,
            ErrorCategory::Generic => &mut self.generic_errors,
        };
        *slot = slot.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn endpoint_formats_families() {
        let v4 = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 443);
        assert_eq!(v4.to_string(), "10.0.0.1:443");
        assert_eq!(v4.family(), AddressFamily::V4);

        let v6 = Endpoint::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8080);
        assert_eq!(v6.to_string(), "[::1]:8080");
        assert_eq!(v6.family(), AddressFamily::V6);
    }

    #[test]
    fn specs_are_trimmed() {
        assert_eq!(TargetSpec::new(" 10.0.0.0/30 ").as_str(), "10.0.0.0/30");
        assert!(PortSpec::new("   ").is_empty());
    }

    #[test]
    fn outcome_constructors() {
        let ep = Endpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 22);
        let ok = ProbeOutcome::connected(ep).with_rtt(Duration::from_millis(3));
        assert!(ok.success);
        assert_eq!(ok.category, None);
        assert_eq!(ok.message, "connected to 127.0.0.1:22");
        assert_eq!(ok.rtt, Duration::from_millis(3));

        let err = ReachError::PortParse("ssh".into());
        let bad = ProbeOutcome::unprobed("127.0.0.1:ssh", &err);
        assert!(!bad.success);
        assert!(!bad.was_probed());
        assert_eq!(bad.category, Some(ErrorCategory::Generic));
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCategory::NetworkUnreachable).unwrap();
        assert_eq!(json, "\"network_unreachable\"");
        assert_eq!(ErrorCategory::ConnectionRefused.to_string(), "connection_refused");
    }

    #[test]
    fn options_presets_and_validation() {
        let audit = ScanOptions::audit();
        assert_eq!(audit.connect_timeout, Duration::from_secs(3));
        assert_eq!(audit.max_concurrency, None);
        assert_eq!(audit.default_port, 443);
        assert!(audit.validate().is_ok());

        assert_eq!(ScanOptions::bounded(64).max_concurrency, Some(64));
        assert!(ScanOptions::bounded(0).validate().is_err());
        assert!(ScanOptions::audit()
            .with_connect_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn stats_count_by_category() {
        let ep = Endpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);
        let mut stats = ScanStats::new();
        stats.update(&ProbeOutcome::connected(ep));
        stats.update(&ProbeOutcome::failed(
            ep,
            ErrorCategory::ConnectionRefused,
            "connection refused by 127.0.0.1:80".into(),
        ));
        stats.update(&ProbeOutcome::unprobed(
            "nowhere.invalid",
            &ReachError::BlockParse {
                block: "x/y".into(),
                reason: "bad prefix".into(),
            },
        ));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed(), 2);
        assert_eq!(stats.refused, 1);
        assert_eq!(stats.generic_errors, 1);
        assert_eq!(stats.unprobed, 1);
        assert!((stats.success_rate() - 33.333).abs() < 0.01);
    }
}
