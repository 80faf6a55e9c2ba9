// crates/roast-clients/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Transport, protocol, and polling failures for service clients.
// Purpose: Give case bodies and fixtures one error type to propagate with `?`.
// Dependencies: thiserror, roast-core
// ============================================================================

//! ## Overview
//! [`ClientError`] converts into case and setup failures so clients can be
//! called with `?` from both.

use roast_core::CaseFailure;
use roast_core::Exchange;
use roast_core::SetupFailure;
use thiserror::Error;

/// Errors raised by service clients and behaviors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// A request target could not be turned into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// A request body could not be encoded.
    #[error("request encoding failed: {0}")]
    Encode(String),
    /// The request did not complete (connect, timeout, read).
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body exceeded the configured limit.
    #[error("response from {url} exceeds {max_bytes} bytes")]
    ResponseTooLarge {
        /// Request URL.
        url: String,
        /// Configured limit.
        max_bytes: usize,
    },
    /// A behavior received a status other than the one it requires.
    #[error("{operation} returned {}, expected {expected}; request: {exchange}", exchange.status)]
    UnexpectedStatus {
        /// Behavior or call name.
        operation: String,
        /// Required status code.
        expected: u16,
        /// Exchange context.
        exchange: Exchange,
    },
    /// A successful response did not decode into the expected entity.
    #[error("{operation} returned no decodable entity; request: {exchange}")]
    MissingEntity {
        /// Behavior or call name.
        operation: String,
        /// Exchange context.
        exchange: Exchange,
    },
    /// A server reached the terminal `ERROR` status.
    #[error("server {id} entered status {status}")]
    ServerFailed {
        /// Server id.
        id: String,
        /// Observed status.
        status: String,
    },
    /// Polling did not reach the target status in time.
    #[error("timed out after {waited_ms} ms waiting for {what}")]
    Timeout {
        /// What was awaited.
        what: String,
        /// Time spent polling.
        waited_ms: u64,
    },
}

impl From<ClientError> for CaseFailure {
    fn from(err: ClientError) -> Self {
        Self::error(err)
    }
}

impl From<ClientError> for SetupFailure {
    fn from(err: ClientError) -> Self {
        Self::new(err.to_string())
    }
}
