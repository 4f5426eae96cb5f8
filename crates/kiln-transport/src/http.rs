//! The `Transport` trait and its reqwest-backed implementation.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};

use crate::auth::sign_request;
use crate::config::ApiConfig;
use crate::error::BackendError;
use crate::request::{ApiRequest, ApiResponse, Body, Method};

/// Header carrying the negotiated API version.
const VERSION_HEADER: &str = "X-Kiln-Version";

/// Trait for sending API requests to the backend.
///
/// The SDK core is agnostic to how requests are actually delivered;
/// tests substitute a scripted implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the response.
    ///
    /// # Errors
    /// Returns `BackendError` on network failure. Non-2xx responses are
    /// returned as-is; callers decide whether they are errors.
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, BackendError>;
}

/// HTTP transport backed by a shared `reqwest::Client`.
///
/// Attaches the date, version and authorization headers to every
/// request. Timeout behavior is entirely this layer's concern; the SDK
/// core never imposes its own.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the given config.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// The config this transport was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, BackendError> {
        let url = self.config.build_url(&req.path)?;
        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        tracing::debug!(method = req.method.as_str(), path = %req.path, "sending API request");

        // Multipart bodies are signed over an empty payload; the form
        // encoding (boundaries included) is owned by the HTTP client.
        let body_bytes = match &req.body {
            Body::Json(value) => serde_json::to_vec(value)?,
            Body::Empty | Body::Multipart(_) => Vec::new(),
        };
        let date = Utc::now();
        let authorization = sign_request(
            &self.config,
            req.method.as_str(),
            &req.path,
            &date,
            req.content_type(),
            &body_bytes,
        )?;

        let mut builder = self
            .client
            .request(method, url)
            .header("Date", date.to_rfc3339())
            .header(USER_AGENT, concat!("Kiln Client for Rust ", env!("CARGO_PKG_VERSION")))
            .header(VERSION_HEADER, self.config.version.as_str())
            .header(AUTHORIZATION, authorization);

        builder = match req.body {
            Body::Empty => builder,
            Body::Json(_) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body_bytes),
            Body::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let file = Part::bytes(part.bytes)
                        .file_name(part.file_name)
                        .mime_str("application/octet-stream")?;
                    form = form.part(part.field, file);
                }
                builder.multipart(form)
            }
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received API response");

        Ok(ApiResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}
