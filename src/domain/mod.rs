//! Domain layer: entities and storage contracts.
//!
//! - [`entities`] - Core data structures and validity-window evaluation
//! - [`repositories`] - Storage trait implemented by the infrastructure layer
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod repositories;
