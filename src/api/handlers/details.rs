//! Handler for the entry details endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::details::DetailsResponse;
use crate::domain::entities::now_millis;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored entry behind a token, regardless of its validity window.
///
/// # Endpoint
///
/// `GET {ctx}/details/{token}`
///
/// # Response
///
/// ```json
/// {
///   "id": 42,
///   "token": "k5Y",
///   "url": "https://example.com",
///   "validFrom": null,
///   "validTill": 1767225600000,
///   "status": "active"
/// }
/// ```
pub async fn details_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DetailsResponse>, AppError> {
    let entry = state.shortener.details(&token).await?;

    Ok(Json(DetailsResponse::new(token, entry, now_millis())))
}
