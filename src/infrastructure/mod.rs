//! Infrastructure layer for external integrations.
//!
//! Implements the storage contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL, Redis and in-memory repositories

pub mod persistence;
