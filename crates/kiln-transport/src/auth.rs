//! HMAC-SHA256 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::ApiConfig;
use crate::error::BackendError;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme identifier sent in the `Authorization` header.
pub const SIGN_METHOD: &str = "HMAC-SHA256";

/// Compute the `Authorization` header value for a request.
///
/// The signature covers the method, path, date, host and content type,
/// plus the SHA-256 digest of the body, keyed by the secret key. It must
/// be computed at the very end of request preparation, right before the
/// request is sent.
///
/// # Errors
/// Returns `BackendError::MissingCredentials` if either key is empty;
/// credentials are only required once a request is actually signed.
pub fn sign_request(
    config: &ApiConfig,
    method: &str,
    path: &str,
    date: &DateTime<Utc>,
    content_type: &str,
    body: &[u8],
) -> Result<String, BackendError> {
    if config.access_key.is_empty() || config.secret_key.is_empty() {
        return Err(BackendError::MissingCredentials);
    }
    let host = config
        .endpoint
        .host_str()
        .ok_or_else(|| BackendError::Signing("endpoint has no host".to_string()))?;
    let body_hash = hex::encode(Sha256::digest(body));
    let canonical = format!(
        "{method}\n{path}\n{date}\nhost:{host}\ncontent-type:{content_type}\n{body_hash}",
        date = date.to_rfc3339(),
    );

    let mut mac = HmacSha256::new_from_slice(config.secret_key.as_bytes())
        .map_err(|e| BackendError::Signing(e.to_string()))?;
    mac.update(canonical.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "KilnAPI signMethod={SIGN_METHOD}, credential={}:{signature}",
        config.access_key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ApiConfig {
        ApiConfig::new("http://localhost:8081", "v1.20240915", "AKIATEST", "SECRET").unwrap()
    }

    fn fixed_date() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-09-15T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_signature_is_deterministic() {
        let config = test_config();
        let date = fixed_date();
        let a = sign_request(&config, "POST", "/kernel/create", &date, "application/json", b"{}")
            .unwrap();
        let b = sign_request(&config, "POST", "/kernel/create", &date, "application/json", b"{}")
            .unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("KilnAPI signMethod=HMAC-SHA256, credential=AKIATEST:"));
    }

    #[test]
    fn test_signature_covers_body() {
        let config = test_config();
        let date = fixed_date();
        let a = sign_request(&config, "POST", "/kernel/k1", &date, "application/json", b"{\"a\":1}")
            .unwrap();
        let b = sign_request(&config, "POST", "/kernel/k1", &date, "application/json", b"{\"a\":2}")
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_credentials_are_rejected() {
        let config = ApiConfig::new("http://localhost:8081", "v1.20240915", "", "").unwrap();
        let result =
            sign_request(&config, "POST", "/kernel/create", &fixed_date(), "application/json", b"{}");
        assert!(matches!(result, Err(BackendError::MissingCredentials)));

        let config = ApiConfig::new("http://localhost:8081", "v1.20240915", "AKIATEST", "").unwrap();
        let result = sign_request(&config, "GET", "/kernel/k1", &fixed_date(), "text/plain", b"");
        assert!(matches!(result, Err(BackendError::MissingCredentials)));
    }

    #[test]
    fn test_signature_covers_path() {
        let config = test_config();
        let date = fixed_date();
        let a = sign_request(&config, "GET", "/kernel/k1", &date, "text/plain", b"").unwrap();
        let b = sign_request(&config, "GET", "/kernel/k2", &date, "text/plain", b"").unwrap();
        assert_ne!(a, b);
    }
}
