//! Errors raised by bus transports and sessions.

use std::io;

use thiserror::Error;

use crate::result::IarmResult;

/// Failures surfaced by a [`crate::BusTransport`].
#[derive(Debug, Error)]
pub enum BusError {
    /// A request was issued before `init` registered a member name.
    #[error("bus member has not been initialised")]
    NotInitialised,
    /// A request was issued while disconnected.
    #[error("bus member '{member}' is not connected")]
    NotConnected {
        /// Member name given to `init`.
        member: String,
    },
    /// The broker address could not be resolved.
    #[error("failed to resolve bus address {endpoint}: {source}")]
    Resolve {
        /// Endpoint as configured.
        endpoint: String,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// The broker refused or timed out the connection.
    #[error("failed to connect to bus at {endpoint}: {source}")]
    Connect {
        /// Endpoint as configured.
        endpoint: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Unix sockets are unavailable on this platform.
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    /// Encoding a request failed.
    #[error("failed to serialise bus request: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing a request failed.
    #[error("failed to send bus request: {0}")]
    Send(#[source] io::Error),
    /// Reading a reply failed.
    #[error("failed to read bus reply: {0}")]
    Receive(#[source] io::Error),
    /// A reply line was not a valid frame.
    #[error("failed to parse bus frame: {0}")]
    Parse(#[source] serde_json::Error),
    /// The broker closed the stream before replying.
    #[error("bus closed the connection before replying to {operation}")]
    ClosedWithoutReply {
        /// Request kind that was awaiting a reply.
        operation: &'static str,
    },
    /// The broker answered with a non-success result code.
    #[error("bus rejected {operation}: {result}")]
    Rejected {
        /// Request kind that was rejected.
        operation: &'static str,
        /// Result code returned by the broker.
        result: IarmResult,
    },
}

impl BusError {
    /// Returns the bus result code that best describes the failure.
    ///
    /// Transport-level failures map to [`IarmResult::IpcCoreFail`].
    #[must_use]
    pub const fn result(&self) -> IarmResult {
        match self {
            Self::Rejected { result, .. } => *result,
            Self::NotInitialised | Self::NotConnected { .. } => IarmResult::InvalidState,
            _ => IarmResult::IpcCoreFail,
        }
    }
}
