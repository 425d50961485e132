//! Error types for reachscan
//!
//! Expansion, input and configuration failures. Connect failures never
//! surface as errors; they are folded into a failed `ProbeOutcome`.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReachError {
    #[error("failed to resolve {name}: {source}")]
    Resolution {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid address block {block}: {reason}")]
    BlockParse { block: String, reason: String },

    #[error("address block {block} holds {size} addresses, above the limit of {limit}")]
    BlockTooLarge {
        block: String,
        size: u128,
        limit: u128,
    },

    #[error("invalid port {0:?}")]
    PortParse(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for reachscan operations
pub type ReachResult<T> = Result<T, ReachError>;
