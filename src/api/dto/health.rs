//! Health check response body.

use serde::Serialize;

/// Overall status is `healthy` only when every check is `ok`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage_backend: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub storage: CheckStatus,
    pub encoder: CheckStatus,
}

/// `ok`, or `error` with the failure message.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Result<(), String>> for CheckStatus {
    fn from(outcome: &Result<(), String>) -> Self {
        match outcome {
            Ok(()) => Self {
                status: "ok".to_string(),
                message: None,
            },
            Err(message) => Self {
                status: "error".to_string(),
                message: Some(message.clone()),
            },
        }
    }
}
