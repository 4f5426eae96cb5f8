//! Wire-level request and response types.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BackendError;

/// HTTP method for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The method name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl UploadPart {
    /// Create an upload part for the given file name and content.
    #[must_use]
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Request body variants.
#[derive(Debug, Clone)]
pub enum Body {
    /// No body.
    Empty,
    /// JSON payload.
    Json(Value),
    /// Multipart file upload.
    Multipart(Vec<UploadPart>),
}

/// One API request, independent of the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

impl ApiRequest {
    /// Create a request with an explicit body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, body: Body) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    /// `GET` request without a body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, Body::Empty)
    }

    /// `POST` request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Body::Json(body))
    }

    /// `PATCH` request without a body.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path, Body::Empty)
    }

    /// `DELETE` request without a body.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, Body::Empty)
    }

    /// `POST` request without a body.
    #[must_use]
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path, Body::Empty)
    }

    /// Multipart `POST` request.
    #[must_use]
    pub fn multipart(path: impl Into<String>, parts: Vec<UploadPart>) -> Self {
        Self::new(Method::Post, path, Body::Multipart(parts))
    }

    /// Content type used for signing and the `Content-Type` header.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self.body {
            Body::Empty => "text/plain",
            Body::Json(_) => "application/json",
            Body::Multipart(_) => "multipart/form-data",
        }
    }
}

/// Response to an API request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub reason: String,
    /// Raw response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// Create a response from its parts.
    #[must_use]
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status / 100 == 2
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    ///
    /// # Errors
    /// Returns error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Convert a non-2xx response into a `BackendError::Api`.
    ///
    /// # Errors
    /// Returns `BackendError::Api` unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self, BackendError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(BackendError::Api {
                status: self.status,
                reason: self.reason.clone(),
                message: self.text(),
            })
        }
    }
}
