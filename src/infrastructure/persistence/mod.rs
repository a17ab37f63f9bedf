//! Storage backend implementations of [`UrlRepository`].
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL, schema managed by sqlx migrations
//! - [`RedisUrlRepository`] - Redis hashes with an `INCR` sequence
//! - [`InMemoryUrlRepository`] - in-process, for local runs and tests
//!
//! [`connect`] selects and connects the configured backend at startup, retrying with a
//! fixed backoff before giving up.

pub mod memory_url_repository;
pub mod pg_url_repository;
pub mod redis_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
pub use redis_url_repository::RedisUrlRepository;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

use crate::config::{Config, StorageBackend};
use crate::domain::repositories::UrlRepository;

/// Connects the backend selected by `config.storage_backend`.
///
/// PostgreSQL connections run pending migrations before returning.
///
/// # Errors
///
/// Returns an error if the connection cannot be established within
/// `STARTUP_RETRY_ATTEMPTS` attempts, or if migrations fail.
pub async fn connect(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    let strategy = FixedInterval::from_millis(config.startup_retry_delay_ms)
        .take(config.startup_retry_attempts.saturating_sub(1));

    match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = Retry::spawn(strategy, || async {
                connect_pool(config, database_url).await.inspect_err(|e| {
                    tracing::warn!(error = %e, "Database connection attempt failed");
                })
            })
            .await
            .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgUrlRepository::new(Arc::new(pool))))
        }
        StorageBackend::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required for the redis backend")?;

            let repository = Retry::spawn(strategy, || async {
                RedisUrlRepository::connect(redis_url).await.inspect_err(|e| {
                    tracing::warn!(error = %e, "Redis connection attempt failed");
                })
            })
            .await
            .context("Failed to connect to Redis")?;

            Ok(Arc::new(repository))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; entries are lost on restart");
            Ok(Arc::new(InMemoryUrlRepository::new()))
        }
    }
}

async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
}
