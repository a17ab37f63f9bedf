//! Cross-origin access for browser clients.

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::shorten::TENANT_HEADER;

/// Any origin may call `GET`, `POST` and `DELETE` with `Content-Type`, `tenantid` and
/// `Authorization` headers. Preflight requests are answered without reaching handlers.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(TENANT_HEADER),
            header::AUTHORIZATION,
        ])
}
