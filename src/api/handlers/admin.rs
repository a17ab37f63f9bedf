//! Handlers for admin endpoints.

use axum::{Json, extract::State};

use crate::api::dto::admin::CleanupResponse;
use crate::application::services::ServiceStats;
use crate::error::AppError;
use crate::state::AppState;

/// Removes every entry whose validity window has ended.
///
/// # Endpoint
///
/// `POST {ctx}/admin/cleanup`
///
/// # Response
///
/// ```json
/// { "message": "Expired entries removed", "deletedCount": 3 }
/// ```
pub async fn cleanup_handler(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let deleted_count = state.shortener.sweep_expired().await?;

    Ok(Json(CleanupResponse {
        message: "Expired entries removed".to_string(),
        deleted_count,
    }))
}

/// Reports entry count and service settings.
///
/// # Endpoint
///
/// `GET {ctx}/admin/stats` (also `GET /stats`)
///
/// # Response
///
/// ```json
/// {
///   "totalUrls": 1024,
///   "storageBackend": "postgres",
///   "minLength": 3,
///   "multiInstance": false,
///   "contextPath": "/url-shortening"
/// }
/// ```
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<ServiceStats>, AppError> {
    Ok(Json(state.shortener.stats().await?))
}
