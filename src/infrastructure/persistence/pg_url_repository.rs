//! PostgreSQL implementation of the URL repository.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::ShortenedEntry;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Row shape of `eg_url_shortener`.
#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    url: String,
    valid_from: Option<i64>,
    valid_till: Option<i64>,
}

impl From<EntryRow> for ShortenedEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            valid_from: row.valid_from,
            valid_till: row.valid_till,
        }
    }
}

/// PostgreSQL repository over table `eg_url_shortener` and sequence `eg_url_shorter_id`.
///
/// Uniqueness of the long URL is enforced by the `eg_url_shortener_url_key` constraint;
/// a violation surfaces as [`AppError::Conflict`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn next_id(&self) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar("SELECT nextval('eg_url_shorter_id')")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(id)
    }

    async fn save(&self, entry: ShortenedEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO eg_url_shortener (id, url, valid_from, valid_till)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET url = EXCLUDED.url,
                          valid_from = EXCLUDED.valid_from,
                          valid_till = EXCLUDED.valid_till
            "#,
        )
        .bind(entry.id)
        .bind(&entry.url)
        .bind(entry.valid_from)
        .bind(entry.valid_till)
        .execute(self.pool.as_ref())
        .await?;

        tracing::debug!(id = entry.id, url = %entry.url, "Entry saved");
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<ShortenedEntry, AppError> {
        let row: Option<EntryRow> = sqlx::query_as(
            "SELECT id, url, valid_from, valid_till FROM eg_url_shortener WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortenedEntry::from)
            .ok_or_else(|| AppError::not_found("URL entry not found", json!({ "id": id })))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ShortenedEntry>, AppError> {
        let row: Option<EntryRow> = sqlx::query_as(
            "SELECT id, url, valid_from, valid_till FROM eg_url_shortener WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortenedEntry::from))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM eg_url_shortener WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "URL entry not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM eg_url_shortener WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM eg_url_shortener WHERE valid_till IS NOT NULL AND valid_till < $1",
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM eg_url_shortener")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| {
                AppError::storage(
                    "Database connection failed",
                    json!({ "check": "connectivity", "reason": e.to_string() }),
                )
            })?;

        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = 'eg_url_shortener')",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        if !table_exists {
            return Err(AppError::storage(
                "Required table is missing",
                json!({ "check": "schema", "table": "eg_url_shortener" }),
            ));
        }

        let sequence_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.sequences WHERE sequence_name = 'eg_url_shorter_id')",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        if !sequence_exists {
            return Err(AppError::storage(
                "Required sequence is missing",
                json!({ "check": "schema", "sequence": "eg_url_shorter_id" }),
            ));
        }

        Ok(())
    }
}
