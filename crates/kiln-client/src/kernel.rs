//! Handle to one remote kernel session.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use kiln_transport::{ApiRequest, ApiResponse, Transport, UploadPart};

use crate::error::ClientError;
use crate::exec::{BatchOpts, CompleteOpts, ExecuteOpts, ExecutionMode, ExecutionResult};

/// Client-side reference to a remote kernel session.
///
/// The identifier is assigned by the server at creation time and is
/// immutable; every operation addresses the same remote session by it.
pub struct Kernel<T: Transport> {
    transport: Arc<T>,
    kernel_id: String,
    created: bool,
}

impl<T: Transport> std::fmt::Debug for Kernel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("kernel_id", &self.kernel_id)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    kernel_id: String,
    created: Option<bool>,
}

/// Check the caller-supplied client session token length.
pub(crate) fn validate_client_token(token: &str) -> Result<(), ClientError> {
    let len = token.chars().count();
    if (4..=64).contains(&len) {
        Ok(())
    } else {
        Err(ClientError::InvalidToken(len))
    }
}

fn generate_client_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Build the request for one execute step.
///
/// The payload shape depends on the mode: run modes post to the kernel
/// endpoint, completion posts to the completion endpoint. Options are
/// only encoded for the modes that use them.
pub(crate) fn encode_execute(
    kernel_id: &str,
    run_id: Option<&str>,
    code: &str,
    mode: ExecutionMode,
    opts: Option<&ExecuteOpts>,
) -> ApiRequest {
    match mode {
        ExecutionMode::Query | ExecutionMode::Continue | ExecutionMode::Input => ApiRequest::post(
            format!("/kernel/{kernel_id}"),
            json!({
                "mode": mode.as_str(),
                "code": code,
                "runId": run_id,
            }),
        ),
        ExecutionMode::Batch => {
            let batch = match opts {
                Some(ExecuteOpts::Batch(b)) => b.clone(),
                _ => BatchOpts::default(),
            };
            ApiRequest::post(
                format!("/kernel/{kernel_id}"),
                json!({
                    "mode": mode.as_str(),
                    "code": code,
                    "runId": run_id,
                    "options": batch,
                }),
            )
        }
        ExecutionMode::Complete => {
            let complete = match opts {
                Some(ExecuteOpts::Complete(c)) => c.clone(),
                _ => CompleteOpts::default(),
            };
            encode_complete(kernel_id, code, &complete)
        }
    }
}

fn encode_complete(kernel_id: &str, code: &str, opts: &CompleteOpts) -> ApiRequest {
    ApiRequest::post(
        format!("/kernel/{kernel_id}/complete"),
        json!({
            "code": code,
            "options": {
                "row": opts.row,
                "col": opts.col,
                "line": opts.line,
                "post": opts.post,
            },
        }),
    )
}

impl<T: Transport> Kernel<T> {
    /// Get an existing session matching the client token, or create a
    /// new one.
    ///
    /// A supplied token must be 4 to 64 characters long; equal tokens
    /// reuse the same server-side session. Without a token a random one
    /// is generated, which always provisions a fresh session.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidToken` before any network call if
    /// the token length is out of range, or a backend error from the
    /// create call.
    pub async fn get_or_create(
        transport: Arc<T>,
        lang: &str,
        client_token: Option<&str>,
        mounts: &[String],
        envs: &HashMap<String, String>,
    ) -> Result<Self, ClientError> {
        let token = match client_token {
            Some(token) => {
                validate_client_token(token)?;
                token.to_string()
            }
            None => generate_client_token(),
        };

        let req = ApiRequest::post(
            "/kernel/create",
            json!({
                "lang": lang,
                "clientSessionToken": token,
                "config": {
                    "mounts": mounts,
                    "envs": envs,
                },
            }),
        );
        let resp = transport.send(req).await?.ensure_success()?;
        let data: CreateResponse = resp.json()?;
        tracing::debug!(kernel_id = %data.kernel_id, created = ?data.created, "kernel ready");

        Ok(Self {
            transport,
            kernel_id: data.kernel_id,
            // Missing on legacy servers, which always create.
            created: data.created.unwrap_or(true),
        })
    }

    /// Re-address an existing session by its identifier or alias.
    #[must_use]
    pub fn attach(transport: Arc<T>, kernel_id: impl Into<String>) -> Self {
        Self {
            transport,
            kernel_id: kernel_id.into(),
            created: false,
        }
    }

    /// Server-assigned session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.kernel_id
    }

    /// Whether the get-or-create call provisioned a new session.
    #[must_use]
    pub const fn created(&self) -> bool {
        self.created
    }

    /// Send one execute step and parse the tagged result.
    ///
    /// `run_id` must be the value returned by the previous step of the
    /// same run, or `None` on the first step (the server assigns one).
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure, or
    /// `ClientError::Protocol` if the response does not carry a result
    /// with one of the understood status tags.
    pub async fn execute(
        &self,
        run_id: Option<&str>,
        code: &str,
        mode: ExecutionMode,
        opts: Option<ExecuteOpts>,
    ) -> Result<ExecutionResult, ClientError> {
        let req = encode_execute(&self.kernel_id, run_id, code, mode, opts.as_ref());
        let resp = self.transport.send(req).await?.ensure_success()?;
        let body: Value = resp.json()?;
        let result = body
            .get("result")
            .ok_or_else(|| ClientError::Protocol("execute response has no result".to_string()))?;
        serde_json::from_value(result.clone())
            .map_err(|e| ClientError::Protocol(format!("bad execute result: {e}")))
    }

    /// Terminate the remote session.
    ///
    /// Returns trailing resource-usage statistics if the server
    /// provides them.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn destroy(&self) -> Result<Option<Value>, ClientError> {
        let req = ApiRequest::delete(format!("/kernel/{}", self.kernel_id));
        let resp = self.transport.send(req).await?.ensure_success()?;
        if resp.status == 200 && !resp.body.is_empty() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }

    /// Restart the remote session in place.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn restart(&self) -> Result<(), ClientError> {
        let req = ApiRequest::patch(format!("/kernel/{}", self.kernel_id));
        self.transport.send(req).await?.ensure_success()?;
        Ok(())
    }

    /// Interrupt the currently running code.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn interrupt(&self) -> Result<(), ClientError> {
        let req = ApiRequest::post_empty(format!("/kernel/{}/interrupt", self.kernel_id));
        self.transport.send(req).await?.ensure_success()?;
        Ok(())
    }

    /// Request code completion candidates at a cursor position.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn complete(&self, code: &str, opts: &CompleteOpts) -> Result<Value, ClientError> {
        let req = encode_complete(&self.kernel_id, code, opts);
        let resp = self.transport.send(req).await?.ensure_success()?;
        Ok(resp.json()?)
    }

    /// Fetch session information.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn get_info(&self) -> Result<Value, ClientError> {
        let req = ApiRequest::get(format!("/kernel/{}", self.kernel_id));
        let resp = self.transport.send(req).await?.ensure_success()?;
        Ok(resp.json()?)
    }

    /// Fetch the session's container logs.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn get_logs(&self) -> Result<Value, ClientError> {
        let req = ApiRequest::get(format!("/kernel/{}/logs", self.kernel_id));
        let resp = self.transport.send(req).await?.ensure_success()?;
        Ok(resp.json()?)
    }

    /// Upload source files into the session.
    ///
    /// Returns the raw response; callers inspect the status themselves
    /// to report upload failures with the server's own words.
    ///
    /// # Errors
    /// Returns a backend error on transport failure.
    pub async fn upload(&self, files: Vec<UploadPart>) -> Result<ApiResponse, ClientError> {
        let req = ApiRequest::multipart(format!("/kernel/{}/upload", self.kernel_id), files);
        Ok(self.transport.send(req).await?)
    }
}

#[cfg(test)]
mod tests {
    use kiln_transport::{Body, Method};

    use super::*;

    #[test]
    fn test_token_length_bounds() {
        assert!(validate_client_token("abc").is_err());
        assert!(validate_client_token("abcd").is_ok());
        assert!(validate_client_token(&"x".repeat(64)).is_ok());
        assert!(matches!(
            validate_client_token(&"x".repeat(65)),
            Err(ClientError::InvalidToken(65))
        ));
    }

    #[test]
    fn test_generated_token_is_within_bounds() {
        let token = generate_client_token();
        assert!(validate_client_token(&token).is_ok());
    }

    #[test]
    fn test_query_payload_shape() {
        let req = encode_execute("k1", None, "print(1)", ExecutionMode::Query, None);
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/kernel/k1");
        let Body::Json(body) = &req.body else {
            panic!("Expected JSON body");
        };
        assert_eq!(body["mode"], "query");
        assert_eq!(body["code"], "print(1)");
        assert_eq!(body["runId"], Value::Null);
        assert!(body.get("options").is_none());
    }

    #[test]
    fn test_input_payload_carries_run_id() {
        let req = encode_execute("k1", Some("r1"), "42", ExecutionMode::Input, None);
        let Body::Json(body) = &req.body else {
            panic!("Expected JSON body");
        };
        assert_eq!(body["mode"], "input");
        assert_eq!(body["runId"], "r1");
    }

    #[test]
    fn test_batch_payload_shape() {
        let opts = ExecuteOpts::Batch(BatchOpts {
            build: Some("make".to_string()),
            build_log: false,
            exec: Some("./a.out".to_string()),
        });
        let req = encode_execute("k1", None, "", ExecutionMode::Batch, Some(&opts));
        let Body::Json(body) = &req.body else {
            panic!("Expected JSON body");
        };
        assert_eq!(body["mode"], "batch");
        assert_eq!(body["options"]["build"], "make");
        assert_eq!(body["options"]["buildLog"], false);
        assert_eq!(body["options"]["exec"], "./a.out");
    }

    #[test]
    fn test_batch_payload_defaults_without_opts() {
        let req = encode_execute("k1", Some("r1"), "", ExecutionMode::Batch, None);
        let Body::Json(body) = &req.body else {
            panic!("Expected JSON body");
        };
        assert_eq!(body["options"]["build"], Value::Null);
        assert_eq!(body["options"]["buildLog"], false);
        assert_eq!(body["options"]["exec"], Value::Null);
    }

    #[test]
    fn test_complete_payload_goes_to_complete_endpoint() {
        let opts = ExecuteOpts::Complete(CompleteOpts {
            row: 1,
            col: 7,
            line: "print(".to_string(),
            post: String::new(),
        });
        let req = encode_execute("k1", None, "print(", ExecutionMode::Complete, Some(&opts));
        assert_eq!(req.path, "/kernel/k1/complete");
        let Body::Json(body) = &req.body else {
            panic!("Expected JSON body");
        };
        assert_eq!(body["code"], "print(");
        assert_eq!(body["options"]["col"], 7);
        assert!(body.get("mode").is_none());
    }
}
