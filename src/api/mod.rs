//! HTTP surface of the shortener.
//!
//! Handlers stay thin: they extract and validate input, call
//! [`ShortenerService`](crate::application::services::ShortenerService) and map the
//! result onto JSON or a redirect. Errors render through
//! [`AppError`](crate::error::AppError).
//!
//! - [`dto`] - Wire types (camelCase JSON)
//! - [`handlers`] - One module per endpoint group
//! - [`middleware`] - Request tracing
//! - [`routes`] - Context-path and root-level route tables

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
