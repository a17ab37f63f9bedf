//! DTOs for admin endpoints.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: u64,
}
