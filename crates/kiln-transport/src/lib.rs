//! HTTP transport layer for the Kiln client.
//!
//! Provides:
//! - `ApiConfig` - Endpoint and credential configuration
//! - `ApiRequest` / `ApiResponse` - Wire-level request and response types
//! - `Transport` - The request-sending trait the SDK core depends on
//! - `HttpTransport` - reqwest-backed implementation with request signing

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod request;

pub use config::ApiConfig;
pub use error::BackendError;
pub use http::{HttpTransport, Transport};
pub use request::{ApiRequest, ApiResponse, Body, Method, UploadPart};
