//! API endpoint and credential configuration.

use url::Url;

use crate::error::BackendError;

/// Default endpoint used when `KILN_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8081";

/// Default API version negotiated with the server.
pub const DEFAULT_API_VERSION: &str = "v1.20240915";

/// Configuration for talking to a Kiln API endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API server.
    pub endpoint: Url,
    /// API version string, e.g. `v1.20240915`.
    pub version: String,
    /// Access key identifying the caller.
    pub access_key: String,
    /// Secret key used to sign requests.
    pub secret_key: String,
}

impl ApiConfig {
    /// Create a config from explicit values.
    ///
    /// # Errors
    /// Returns error if the endpoint is not a valid URL.
    pub fn new(
        endpoint: &str,
        version: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| BackendError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        Ok(Self {
            endpoint,
            version: version.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        })
    }

    /// Load the config from `KILN_ENDPOINT`, `KILN_API_VERSION`,
    /// `KILN_ACCESS_KEY` and `KILN_SECRET_KEY`.
    ///
    /// Missing credentials are tolerated here; they only matter once a
    /// request is signed.
    ///
    /// # Errors
    /// Returns error if `KILN_ENDPOINT` holds an invalid URL.
    pub fn from_env() -> Result<Self, BackendError> {
        let endpoint =
            std::env::var("KILN_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let version =
            std::env::var("KILN_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        let access_key = std::env::var("KILN_ACCESS_KEY").unwrap_or_default();
        let secret_key = std::env::var("KILN_SECRET_KEY").unwrap_or_default();
        Self::new(&endpoint, version, access_key, secret_key)
    }

    /// Major version component of the API version, e.g. `v1`.
    #[must_use]
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or(&self.version)
    }

    /// Build the full URL for an API path.
    ///
    /// The path is joined under the major API version:
    /// `{endpoint}/{major}/kernel/create`.
    ///
    /// # Errors
    /// Returns error if the joined URL is invalid.
    pub fn build_url(&self, path: &str) -> Result<Url, BackendError> {
        let trimmed = path.trim_start_matches('/');
        let full = format!("{}/{}", self.major_version(), trimmed);
        self.endpoint
            .join(&full)
            .map_err(|e| BackendError::InvalidEndpoint(format!("{full}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_version() {
        let config = ApiConfig::new("http://localhost:8081", "v1.20240915", "AK", "SK").unwrap();
        assert_eq!(config.major_version(), "v1");
    }

    #[test]
    fn test_build_url_joins_major_version() {
        let config = ApiConfig::new("http://localhost:8081", "v1.20240915", "AK", "SK").unwrap();
        let url = config.build_url("/kernel/create").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/v1/kernel/create");
    }

    #[test]
    fn test_build_url_without_leading_slash() {
        let config = ApiConfig::new("http://localhost:8081", "v1.20240915", "AK", "SK").unwrap();
        let url = config.build_url("admin/graphql").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/v1/admin/graphql");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = ApiConfig::new("not a url", "v1.20240915", "AK", "SK");
        assert!(matches!(result, Err(BackendError::InvalidEndpoint(_))));
    }
}
