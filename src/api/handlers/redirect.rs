//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a token to its long URL.
///
/// # Endpoint
///
/// `GET {ctx}/{token}` (also `GET /{token}`)
///
/// # Request Flow
///
/// 1. Decode the token into an id (no storage access for undecodable tokens)
/// 2. Fetch the entry
/// 3. Check the validity window at the current time
/// 4. Return 302 Found with `Location`
///
/// # Errors
///
/// - 404: undecodable token, unknown id, or window not yet started
/// - 410: window ended
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let long_url = state.shortener.resolve(&token).await?;

    tracing::debug!(token = %token, url = %long_url, "Redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]).into_response())
}
