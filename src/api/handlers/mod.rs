//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod delete;
pub mod details;
pub mod health;
pub mod redirect;
pub mod shorten;

pub use admin::{cleanup_handler, stats_handler};
pub use delete::delete_handler;
pub use details::details_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
