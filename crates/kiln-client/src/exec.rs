//! Execute-step wire protocol types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Status tag of one execute step.
///
/// The set is closed: a response carrying any other tag is a protocol
/// violation and fails the run loudly at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Batch build phase completed; an execution phase always follows.
    BuildFinished,
    /// Run completed. The only terminal status.
    Finished,
    /// Server needs interactive input before continuing.
    WaitingInput,
    /// Server wants another step with empty code in the same run.
    Continued,
}

/// One console record: a (stream name, text) pair relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleRecord(pub String, pub String);

impl ConsoleRecord {
    /// Stream name, e.g. `stdout` or `stderr`.
    #[must_use]
    pub fn stream(&self) -> &str {
        &self.0
    }

    /// Text content of the record.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.1
    }
}

/// Options attached to a `waiting-input` step.
///
/// Only `is_password` is interpreted; unknown keys are ignored so newer
/// servers can add options without breaking older clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOptions {
    /// Whether the requested input must be read without echo.
    #[serde(default)]
    pub is_password: bool,
}

/// Result of one execute call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Server-assigned run identifier, echoed back on every subsequent
    /// call in the same run.
    pub run_id: String,
    /// Status tag of this step.
    pub status: RunStatus,
    /// Exit code, present on `finished` and `build-finished` steps.
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Ordered console records to emit.
    #[serde(default)]
    pub console: Vec<ConsoleRecord>,
    /// Input options, present on `waiting-input` steps.
    #[serde(default)]
    pub options: Option<InputOptions>,
}

/// Execution mode, determining the payload shape of one execute call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run a code snippet.
    Query,
    /// Continue the current run with empty code.
    Continue,
    /// Supply interactive input to the current run.
    Input,
    /// Build and run previously uploaded files.
    Batch,
    /// Request code completion candidates.
    Complete,
}

impl ExecutionMode {
    /// The mode name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Continue => "continue",
            Self::Input => "input",
            Self::Batch => "batch",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "continue" => Ok(Self::Continue),
            "input" => Ok(Self::Input),
            "batch" => Ok(Self::Batch),
            "complete" => Ok(Self::Complete),
            other => Err(ClientError::InvalidMode(other.to_string())),
        }
    }
}

/// Options for the first call of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOpts {
    /// Custom build command, `*` for the runtime default.
    pub build: Option<String>,
    /// Whether to stream the build log.
    #[serde(default)]
    pub build_log: bool,
    /// Custom exec command, `*` for the runtime default.
    pub exec: Option<String>,
}

/// Cursor context for a completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteOpts {
    pub row: u32,
    pub col: u32,
    pub line: String,
    pub post: String,
}

/// Mode-specific options for one execute call.
#[derive(Debug, Clone)]
pub enum ExecuteOpts {
    /// Build/exec commands for a batch run.
    Batch(BatchOpts),
    /// Cursor context for a completion request.
    Complete(CompleteOpts),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_kebab_case_tags() {
        let status: RunStatus = serde_json::from_str("\"build-finished\"").unwrap();
        assert_eq!(status, RunStatus::BuildFinished);
        let status: RunStatus = serde_json::from_str("\"waiting-input\"").unwrap();
        assert_eq!(status, RunStatus::WaitingInput);
    }

    #[test]
    fn test_unknown_status_tag_is_rejected() {
        let result = serde_json::from_str::<RunStatus>("\"paused\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_console_record_is_a_pair() {
        let rec: ConsoleRecord = serde_json::from_str(r#"["stdout", "1\n"]"#).unwrap();
        assert_eq!(rec.stream(), "stdout");
        assert_eq!(rec.text(), "1\n");
    }

    #[test]
    fn test_result_parse_with_optional_fields_absent() {
        let result: ExecutionResult =
            serde_json::from_str(r#"{"runId": "r1", "status": "continued"}"#).unwrap();
        assert_eq!(result.run_id, "r1");
        assert_eq!(result.status, RunStatus::Continued);
        assert!(result.exit_code.is_none());
        assert!(result.console.is_empty());
        assert!(result.options.is_none());
    }

    #[test]
    fn test_input_options_ignore_unknown_keys() {
        let opts: InputOptions =
            serde_json::from_str(r#"{"is_password": true, "echo_char": "*"}"#).unwrap();
        assert!(opts.is_password);
    }

    #[test]
    fn test_batch_opts_wire_names() {
        let opts = BatchOpts {
            build: Some("make".to_string()),
            build_log: true,
            exec: Some("./a.out".to_string()),
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["build"], "make");
        assert_eq!(json["buildLog"], true);
        assert_eq!(json["exec"], "./a.out");
    }

    #[test]
    fn test_mode_from_str_rejects_unknown() {
        assert!("query".parse::<ExecutionMode>().is_ok());
        let err = "stream".parse::<ExecutionMode>().unwrap_err();
        assert!(matches!(err, ClientError::InvalidMode(m) if m == "stream"));
    }
}
