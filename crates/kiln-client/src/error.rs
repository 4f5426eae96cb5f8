//! SDK error type.

use thiserror::Error;

use kiln_transport::BackendError;

/// Error raised by SDK operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failure signaled by the remote service or the transport.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// An execute response outside the understood protocol. Indicates a
    /// client/server contract mismatch and is never silently skipped.
    #[error("Protocol violation: {0}")]
    Protocol(String),
    /// A requested execution mode the client does not recognize.
    /// Raised before any network call is made.
    #[error("Invalid execution mode: {0}")]
    InvalidMode(String),
    /// Client session token outside the 4..=64 character range.
    /// Raised before any network call is made.
    #[error("Client session token should be 4 to 64 characters long (got {0})")]
    InvalidToken(usize),
    /// Interactive input could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
