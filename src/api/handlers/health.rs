//! Liveness and readiness check.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// `GET /health`
///
/// Runs the storage backend check and the encoder round-trip self-test. Answers
/// `200` when both pass and `503` with the same body otherwise:
///
/// ```json
/// {
///   "status": "degraded",
///   "version": "0.1.0",
///   "storage_backend": "redis",
///   "checks": {
///     "storage": { "status": "error", "message": "Redis PING failed" },
///     "encoder": { "status": "ok" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let report = state.shortener.health().await;
    let healthy = report.is_healthy();

    let body = Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_backend: state.shortener.backend().to_string(),
        checks: HealthChecks {
            storage: CheckStatus::from(&report.storage),
            encoder: CheckStatus::from(&report.encoder),
        },
    });

    if !healthy {
        tracing::warn!(
            storage = ?report.storage,
            encoder = ?report.encoder,
            "Health check degraded"
        );
        return Err((StatusCode::SERVICE_UNAVAILABLE, body));
    }

    Ok(body)
}
