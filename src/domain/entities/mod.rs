//! Core domain entities.
//!
//! - [`ShortenedEntry`] - A stored id → long URL mapping with an optional validity window
//! - [`NewEntry`] - Input for creating an entry before an id is allocated
//! - [`Validity`] - Window status of an entry at a given instant

pub mod entry;

pub use entry::{NewEntry, ShortenedEntry, Validity, now_millis};
