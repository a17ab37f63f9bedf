//! Handler for deleting a short URL.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::admin::DeleteResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Deletes the entry behind a token. The id is retired and never reissued.
///
/// # Endpoint
///
/// `DELETE {ctx}/{token}`
///
/// # Errors
///
/// - 404: undecodable token or no such entry
pub async fn delete_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = state.shortener.delete(&token).await?;

    Ok(Json(DeleteResponse {
        message: "Short URL deleted".to_string(),
        id,
    }))
}
