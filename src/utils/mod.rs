//! Pure helpers shared across the application.
//!
//! - [`hash_id`] - Reversible id ⇄ token encoding (hashids)
//! - [`url_validator`] - Long URL validation and sanitization

pub mod hash_id;
pub mod url_validator;
