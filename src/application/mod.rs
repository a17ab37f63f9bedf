//! Application layer services implementing business logic.
//!
//! Services consume the [`UrlRepository`](crate::domain::repositories::UrlRepository)
//! trait and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::ShortenerService`] - Shorten, resolve and admin operations
//! - [`services::HostResolver`] - Tenant → public host resolution
//! - [`services::run_expiry_sweeper`] - Background expiry sweep loop

pub mod services;
