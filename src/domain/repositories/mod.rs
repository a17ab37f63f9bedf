//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence` and are selected at startup from configuration.
//! Mock implementations are auto-generated via `mockall` for testing.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for the live-backend suites.

pub mod url_repository;

pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
