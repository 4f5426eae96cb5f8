//! Transport-level error type.

use thiserror::Error;

/// Any failure signaled by the remote service or the transport itself.
///
/// Backend errors are never retried by the SDK; they unwind to the
/// caller, which decides whether to clean up the session.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request to the API endpoint has failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {status} {reason}: {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },
    #[error("Malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Missing credentials: set KILN_ACCESS_KEY and KILN_SECRET_KEY")]
    MissingCredentials,
    #[error("Request signing failed: {0}")]
    Signing(String),
}
