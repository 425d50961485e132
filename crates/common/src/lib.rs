//! Reachscan Common - Shared types and traits
//!
//! This crate provides the data model, error taxonomy, connect failure
//! classification and the `Prober` seam used across the reachscan workspace.

pub mod classify;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use classify::{classify, ConnectFailure};
pub use error::{ReachError, ReachResult};
pub use traits::Prober;
pub use types::{
    AddressFamily, Endpoint, ErrorCategory, PortSpec, ProbeOutcome, ScanOptions, ScanRecord,
    ScanStats, TargetSpec, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_BLOCK_SIZE, DEFAULT_PORT,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
