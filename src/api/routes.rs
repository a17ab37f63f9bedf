//! API route configuration.

use crate::api::handlers::{
    cleanup_handler, delete_handler, details_handler, redirect_handler, shorten_handler,
    stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes served under the configured context path.
///
/// # Endpoints
///
/// - `POST   /shortener`        - Shorten a long URL
/// - `GET    /{token}`          - Redirect to the long URL
/// - `DELETE /{token}`          - Delete an entry
/// - `GET    /details/{token}`  - Stored entry details
/// - `POST   /admin/cleanup`    - Remove expired entries
/// - `GET    /admin/stats`      - Entry count and service settings
pub fn context_routes() -> Router<AppState> {
    Router::new()
        .route("/shortener", post(shorten_handler))
        .route("/{token}", get(redirect_handler).delete(delete_handler))
        .route("/details/{token}", get(details_handler))
        .route("/admin/cleanup", post(cleanup_handler))
        .route("/admin/stats", get(stats_handler))
}

/// Root-level aliases of the public endpoints.
///
/// - `POST /shortener`
/// - `GET  /{token}`
pub fn root_aliases() -> Router<AppState> {
    Router::new()
        .route("/shortener", post(shorten_handler))
        .route("/{token}", get(redirect_handler))
}
