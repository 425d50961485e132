//! Connect failure classification
//!
//! Maps the failure surface of a timed TCP connect onto `ErrorCategory`.
//! Precedence: deadline first, then OS error codes, then transport-level
//! failures without a code, then everything else.

use std::io;

use crate::types::ErrorCategory;

/// Structured description of why a connect attempt produced no stream.
#[derive(Debug)]
pub enum ConnectFailure {
    /// The deadline elapsed before the handshake completed.
    DeadlineExceeded,
    /// The socket layer reported an error.
    Io(io::Error),
    /// The attempt failed outside the socket layer (e.g. the task died).
    Other(String),
}

impl From<io::Error> for ConnectFailure {
    fn from(err: io::Error) -> Self {
        ConnectFailure::Io(err)
    }
}

#[cfg(unix)]
const REFUSED_CODES: &[i32] = &[libc::ECONNREFUSED];
#[cfg(unix)]
const UNREACHABLE_CODES: &[i32] = &[libc::ENETUNREACH, libc::EHOSTUNREACH];

// WSAECONNREFUSED, WSAENETUNREACH, WSAEHOSTUNREACH
#[cfg(windows)]
const REFUSED_CODES: &[i32] = &[10061];
#[cfg(windows)]
const UNREACHABLE_CODES: &[i32] = &[10051, 10065];

#[cfg(not(any(unix, windows)))]
const REFUSED_CODES: &[i32] = &[];
#[cfg(not(any(unix, windows)))]
const UNREACHABLE_CODES: &[i32] = &[];

/// Classify `failure` for the endpoint formatted as `address`.
///
/// Total and deterministic: every input maps to exactly one category and
/// a message built from that category's template.
pub fn classify(address: &str, failure: &ConnectFailure) -> (ErrorCategory, String) {
    let category = categorize(failure);
    let message = match (category, failure) {
        (ErrorCategory::Timeout, _) => format!("connection timeout to {address}"),
        (ErrorCategory::ConnectionRefused, _) => format!("connection refused by {address}"),
        (ErrorCategory::NetworkUnreachable, _) => format!("network unreachable for {address}"),
        (ErrorCategory::SystemError, f) => format!("system error for {address}: {}", detail(f)),
        (ErrorCategory::OperationError, f) => {
            format!("operation error for {address}: {}", detail(f))
        }
        (ErrorCategory::Generic, f) => format!("failed to connect to {address}: {}", detail(f)),
    };
    (category, message)
}

fn categorize(failure: &ConnectFailure) -> ErrorCategory {
    let err = match failure {
        ConnectFailure::DeadlineExceeded => return ErrorCategory::Timeout,
        ConnectFailure::Other(_) => return ErrorCategory::Generic,
        ConnectFailure::Io(err) => err,
    };

    if err.kind() == io::ErrorKind::TimedOut {
        return ErrorCategory::Timeout;
    }

    match err.raw_os_error() {
        Some(code) if REFUSED_CODES.contains(&code) => ErrorCategory::ConnectionRefused,
        Some(code) if UNREACHABLE_CODES.contains(&code) => ErrorCategory::NetworkUnreachable,
        Some(_) => ErrorCategory::SystemError,
        None if err.kind() == io::ErrorKind::ConnectionRefused => {
            ErrorCategory::ConnectionRefused
        }
        None => ErrorCategory::OperationError,
    }
}

fn detail(failure: &ConnectFailure) -> String {
    match failure {
        ConnectFailure::DeadlineExceeded => "deadline exceeded".to_string(),
        ConnectFailure::Io(err) => err.to_string(),
        ConnectFailure::Other(reason) => reason.clone(),
    }
}
