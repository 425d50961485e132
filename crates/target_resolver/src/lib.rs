//! Target Resolver - address block expansion, name resolution and port specs
//!
//! Turns one record's raw tokens into concrete addresses and ports.
//! Supported target forms:
//! - single address: "10.0.0.5", "2001:db8::1"
//! - address block: "192.168.1.0/24", "fd00::/120"
//! - hostname: "example.com"

mod block;
mod ports;

pub use ports::{parse_port, PortSetExpander};

use reachscan_common::{ReachError, ReachResult, TargetSpec, DEFAULT_MAX_BLOCK_SIZE};
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

const BLOCK_DELIMITER: char = '/';

/// Upper bound on a single name lookup; the dispatcher waits on it.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Expands a `TargetSpec` into the addresses it denotes.
#[derive(Debug, Clone, Copy)]
pub struct TargetExpander {
    max_block_size: u128,
}

impl TargetExpander {
    pub fn new() -> Self {
        Self {
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }

    /// Cap on the number of addresses a single block may expand to.
    pub fn with_max_block_size(mut self, size: u128) -> Self {
        self.max_block_size = size;
        self
    }

    /// Expand a target into addresses.
    ///
    /// Literals come back as-is, blocks are enumerated in ascending order,
    /// anything else is resolved. Resolution runs inside
    /// `tokio::task::spawn_blocking` so the runtime is never stalled on DNS,
    /// and a lookup that outlives its deadline fails as a resolution error.
    pub async fn expand(&self, spec: &TargetSpec) -> ReachResult<Vec<IpAddr>> {
        let raw = spec.as_str();
        if raw.is_empty() {
            return Err(ReachError::Resolution {
                name: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty target"),
            });
        }

        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        if raw.contains(BLOCK_DELIMITER) {
            let addrs = block::expand_block(raw, self.max_block_size)?;
            debug!(block = raw, count = addrs.len(), "expanded address block");
            return Ok(addrs);
        }

        let addrs = resolve_name(raw).await?;
        debug!(host = raw, count = addrs.len(), "resolved name");
        Ok(addrs)
    }
}

impl Default for TargetExpander {
    fn default() -> Self {
        Self::new()
    }
}

async fn resolve_name(name: &str) -> ReachResult<Vec<IpAddr>> {
    resolve_with(name, RESOLVE_TIMEOUT, system_lookup).await
}

fn system_lookup(host: String) -> io::Result<Vec<IpAddr>> {
    (host.as_str(), 0)
        .to_socket_addrs()
        .map(|addrs| addrs.map(|a| a.ip()).collect())
}

/// Run a blocking `lookup` off the runtime, giving up after `deadline`.
async fn resolve_with<F>(name: &str, deadline: Duration, lookup: F) -> ReachResult<Vec<IpAddr>>
where
    F: FnOnce(String) -> io::Result<Vec<IpAddr>> + Send + 'static,
{
    let host = name.to_string();
    let lookup = tokio::time::timeout(deadline, tokio::task::spawn_blocking(move || lookup(host)));

    let resolution_error = |source: io::Error| ReachError::Resolution {
        name: name.to_string(),
        source,
    };
    let addrs = match lookup.await {
        Ok(Ok(Ok(addrs))) => addrs,
        Ok(Ok(Err(e))) => return Err(resolution_error(e)),
        Ok(Err(join)) => return Err(resolution_error(io::Error::new(io::ErrorKind::Other, join))),
        Err(_) => {
            return Err(resolution_error(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("lookup exceeded {deadline:?}"),
            )))
        }
    };

    if addrs.is_empty() {
        return Err(resolution_error(io::Error::new(
            io::ErrorKind::NotFound,
            "resolver returned no addresses",
        )));
    }
    Ok(addrs)
}
