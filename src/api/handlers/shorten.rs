//! Handler for the shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's (possibly city-level) tenant id.
pub const TENANT_HEADER: &str = "tenantid";

/// Shortens a long URL.
///
/// # Endpoint
///
/// `POST {ctx}/shortener` (also `POST /shortener`)
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "validFrom": 1735689600000,
///   "validTill": 1767225600000
/// }
/// ```
///
/// `validFrom` / `validTill` are optional epoch milliseconds. In multi-instance mode the
/// optional `tenantid` header selects the public host.
///
/// # Response
///
/// ```json
/// { "shortUrl": "https://s.example.com/url-shortening/k5Y" }
/// ```
///
/// Shortening the same URL again returns the same short URL.
///
/// # Errors
///
/// - 400: malformed body, invalid request shape, invalid URL, unresolvable tenant
/// - 500: storage failure
/// - 504: request deadline exceeded
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let tenant_id = headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok());

    let shortened = state.shortener.shorten(payload.into(), tenant_id).await?;

    Ok(Json(ShortenResponse {
        short_url: shortened.short_url,
    }))
}
