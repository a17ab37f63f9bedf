//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`          - Storage and encoder health
//! - `GET  /stats`           - Service stats
//! - `{ctx}/*`               - Shortening API (see [`crate::api::routes::context_routes`])
//! - `POST /shortener`, `GET /{token}` - Root aliases
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin; preflight answered by the layer
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, stats_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes plus the CORS and tracing layers.
///
/// `context_path` must be normalized (see [`crate::config::normalize_context_path`]).
/// With an empty context path the API is mounted at the root and the aliases are
/// redundant.
pub fn build_router(state: AppState, context_path: &str) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler));

    let router = if context_path.is_empty() {
        router.merge(api::routes::context_routes())
    } else {
        router
            .nest(context_path, api::routes::context_routes())
            .merge(api::routes::root_aliases())
    };

    router
        .with_state(state)
        .layer(cors::layer())
        .layer(tracing::layer())
}

/// Constructs the application service: [`build_router`] wrapped in trailing-slash
/// normalization.
pub fn app_router(state: AppState, context_path: &str) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, context_path))
}
