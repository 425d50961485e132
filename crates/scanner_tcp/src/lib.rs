//! TCP connect prober
//!
//! Reachability only: a probe is one timed handshake, closed as soon as it
//! completes.

mod scanner;

pub use scanner::TcpProber;
