//! Port spec expansion
//!
//! `"A-B"` yields the two literal ports `A` and `B`, not the inclusive range
//! between them. Each side is parsed on its own, so one bad side does not
//! hide the other.

use reachscan_common::{PortSpec, ReachError, ReachResult, DEFAULT_PORT};

const PAIR_DELIMITER: char = '-';

/// Turns a `PortSpec` into the ports to probe, one parse result per slot.
#[derive(Debug, Clone, Copy)]
pub struct PortSetExpander {
    default_port: u16,
}

impl PortSetExpander {
    pub fn new(default_port: u16) -> Self {
        Self { default_port }
    }

    /// Expand `spec`. Malformed tokens come back as `Err(PortParse)` in their
    /// slot so the caller can report them per endpoint.
    pub fn expand(&self, spec: &PortSpec) -> Vec<ReachResult<u16>> {
        let raw = spec.as_str();
        if raw.is_empty() {
            return vec![Ok(self.default_port)];
        }
        match raw.split_once(PAIR_DELIMITER) {
            Some((first, second)) => vec![parse_port(first), parse_port(second)],
            None => vec![parse_port(raw)],
        }
    }
}

impl Default for PortSetExpander {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

/// Parse a single port token; 0 is not a connectable port.
pub fn parse_port(token: &str) -> ReachResult<u16> {
    let token = token.trim();
    match token.parse::<u16>() {
        Ok(0) | Err(_) => Err(ReachError::PortParse(token.to_string())),
        Ok(port) => Ok(port),
    }
}
