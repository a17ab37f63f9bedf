//! Storage contract for shortened URL entries.

use async_trait::async_trait;

use crate::domain::entities::ShortenedEntry;
use crate::error::AppError;

/// Storage backend for shortened URL entries.
///
/// The backend owns the id sequence: ids come from its native atomic primitive, are
/// never reused (not even after deletion) and are never computed in-process by callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::RedisUrlRepository`] - Redis
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - in-process
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Short backend name: `"postgres"`, `"redis"` or `"memory"`.
    fn backend(&self) -> &'static str;

    /// Atomically allocates the next id. Ids start at 1.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the sequence cannot be advanced.
    async fn next_id(&self) -> Result<i64, AppError>;

    /// Persists an entry, replacing any existing entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a different id already owns `entry.url`.
    /// Returns [`AppError::Storage`] on backend failures.
    async fn save(&self, entry: ShortenedEntry) -> Result<(), AppError>;

    /// Fetches an entry by id. The validity window is not applied.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry has this id.
    async fn get(&self, id: i64) -> Result<ShortenedEntry, AppError>;

    /// Finds the entry that owns a long URL, if any.
    async fn find_by_url(&self, url: &str) -> Result<Option<ShortenedEntry>, AppError>;

    /// Deletes an entry. Its id stays retired.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry has this id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Returns whether an entry exists. Absence is not an error.
    async fn exists(&self, id: i64) -> Result<bool, AppError>;

    /// Deletes every entry whose `valid_till` is before `now` (epoch ms).
    ///
    /// Returns the number of removed entries; repeated calls at the same instant return 0.
    async fn sweep_expired(&self, now: i64) -> Result<u64, AppError>;

    /// Number of stored entries.
    async fn count(&self) -> Result<u64, AppError>;

    /// Verifies connectivity and that the backend's schema objects exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] with the failing check in `details`.
    async fn health_check(&self) -> Result<(), AppError>;
}
