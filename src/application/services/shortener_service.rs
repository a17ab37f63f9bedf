//! URL shortening and resolution service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use super::host_resolver::HostResolver;
use crate::domain::entities::{NewEntry, ShortenedEntry, Validity, now_millis};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::hash_id::HashIdCodec;
use crate::utils::url_validator::{MAX_URL_LENGTH, UrlValidator};

/// Result of a successful shorten call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub short_url: String,
    pub token: String,
    pub id: i64,
}

/// Service-level counters and settings reported by the admin endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub total_urls: u64,
    pub storage_backend: &'static str,
    pub min_length: usize,
    pub multi_instance: bool,
    pub context_path: String,
}

/// Outcome of each health check; `Err` carries the failure message.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub storage: Result<(), String>,
    pub encoder: Result<(), String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.storage.is_ok() && self.encoder.is_ok()
    }
}

/// Composes URL validation, id allocation, token encoding and storage.
///
/// Every storage round-trip of a public operation runs under `request_timeout`; when it
/// elapses the in-flight future is dropped and [`AppError::Timeout`] is returned.
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    codec: HashIdCodec,
    validator: UrlValidator,
    hosts: HostResolver,
    request_timeout: Duration,
}

impl ShortenerService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        codec: HashIdCodec,
        validator: UrlValidator,
        hosts: HostResolver,
        request_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            codec,
            validator,
            hosts,
            request_timeout,
        }
    }

    pub fn codec(&self) -> &HashIdCodec {
        &self.codec
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }

    /// Shortens a long URL.
    ///
    /// Shortening is idempotent on the sanitized URL: a URL that already has an entry
    /// returns that entry's token without allocating a new id. The existing entry's
    /// validity window is kept even if the request carries a different one.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is blank or `valid_from >= valid_till`
    /// - [`AppError::InvalidUrl`] if the URL fails validation
    /// - [`AppError::TenantNotConfigured`] if the tenant host cannot be resolved
    /// - [`AppError::Storage`] / [`AppError::Timeout`] on backend failures
    pub async fn shorten(
        &self,
        request: NewEntry,
        tenant_id: Option<&str>,
    ) -> Result<ShortenedUrl, AppError> {
        if request.url.trim().is_empty() {
            return Err(AppError::bad_request(
                "URL cannot be empty",
                json!({ "field": "url" }),
            ));
        }

        if !request.has_valid_window() {
            return Err(AppError::bad_request(
                "validFrom must be earlier than validTill",
                json!({ "validFrom": request.valid_from, "validTill": request.valid_till }),
            ));
        }

        let url = self
            .validator
            .validate_and_sanitize(&request.url)
            .ok_or_else(|| AppError::invalid_url("Invalid URL", json!({ "url": request.url })))?;

        let sanitized_length = url.chars().count();
        if sanitized_length > MAX_URL_LENGTH {
            return Err(AppError::invalid_url(
                "URL is too long after normalization",
                json!({ "length": sanitized_length, "max_length": MAX_URL_LENGTH }),
            ));
        }

        let host = self.hosts.resolve_host(tenant_id)?;

        let new_entry = NewEntry {
            url,
            valid_from: request.valid_from,
            valid_till: request.valid_till,
        };
        let (entry, created) = self
            .with_deadline("shorten", self.find_or_create(new_entry))
            .await?;

        let token = self.codec.encode(entry.id)?;
        let short_url = self.hosts.compose_short_url(&host, &token);

        if created {
            metrics::counter!("shortener_urls_created_total").increment(1);
            tracing::info!(
                id = entry.id,
                token = %token,
                url = %entry.url,
                tenant = ?tenant_id,
                "Short URL created"
            );
        } else {
            tracing::debug!(id = entry.id, token = %token, "Existing short URL returned");
        }

        Ok(ShortenedUrl {
            short_url,
            token,
            id: entry.id,
        })
    }

    /// Resolves a token to its long URL, enforcing the validity window.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidToken`] if the token does not decode
    /// - [`AppError::NotFound`] if no entry has the decoded id
    /// - [`AppError::NotYetActive`] / [`AppError::Expired`] outside the window
    pub async fn resolve(&self, token: &str) -> Result<String, AppError> {
        let id = self.codec.decode(token)?;
        let entry = self
            .with_deadline("resolve", self.repository.get(id))
            .await?;

        match entry.status_at(now_millis()) {
            Validity::Active => {
                metrics::counter!("shortener_redirects_total").increment(1);
                Ok(entry.url)
            }
            Validity::NotYetActive => Err(AppError::not_yet_active(
                "Short URL is not yet active",
                json!({ "token": token, "validFrom": entry.valid_from }),
            )),
            Validity::Expired => Err(AppError::expired(
                "Short URL has expired",
                json!({ "token": token, "validTill": entry.valid_till }),
            )),
        }
    }

    /// Returns the stored entry for a token without applying the window.
    pub async fn details(&self, token: &str) -> Result<ShortenedEntry, AppError> {
        let id = self.codec.decode(token)?;
        self.with_deadline("details", self.repository.get(id))
            .await
    }

    /// Deletes the entry behind a token and returns its id. The id is never reissued.
    pub async fn delete(&self, token: &str) -> Result<i64, AppError> {
        let id = self.codec.decode(token)?;
        self.with_deadline("delete", self.repository.delete(id))
            .await?;

        tracing::info!(id, token, "Short URL deleted");
        Ok(id)
    }

    /// Returns whether a token refers to a stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidToken`] for a token that does not decode.
    pub async fn exists(&self, token: &str) -> Result<bool, AppError> {
        let id = self.codec.decode(token)?;
        self.with_deadline("exists", self.repository.exists(id))
            .await
    }

    /// Removes every entry whose window ended before now.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let removed = self
            .with_deadline("sweep_expired", self.repository.sweep_expired(now_millis()))
            .await?;

        if removed > 0 {
            metrics::counter!("shortener_expired_swept_total").increment(removed);
            tracing::info!(removed, "Expired entries swept");
        }

        Ok(removed)
    }

    pub async fn stats(&self) -> Result<ServiceStats, AppError> {
        let total_urls = self
            .with_deadline("stats", self.repository.count())
            .await?;

        Ok(ServiceStats {
            total_urls,
            storage_backend: self.repository.backend(),
            min_length: self.codec.min_length(),
            multi_instance: self.hosts.is_multi_instance(),
            context_path: self.hosts.context_path().to_string(),
        })
    }

    /// Runs the storage health check and the encoder self-test.
    pub async fn health(&self) -> HealthReport {
        let storage = self
            .with_deadline("health", self.repository.health_check())
            .await
            .map_err(|e| e.to_string());
        let encoder = self.codec.self_test().map_err(|e| e.to_string());

        HealthReport { storage, encoder }
    }

    /// Looks the URL up first; allocates and saves only on a miss. If a concurrent
    /// creator wins the uniqueness race, its entry is returned.
    async fn find_or_create(
        &self,
        new_entry: NewEntry,
    ) -> Result<(ShortenedEntry, bool), AppError> {
        if let Some(existing) = self.repository.find_by_url(&new_entry.url).await? {
            return Ok((existing, false));
        }

        let id = self.repository.next_id().await?;
        let entry = ShortenedEntry::new(id, new_entry);

        match self.repository.save(entry.clone()).await {
            Ok(()) => Ok((entry, true)),
            Err(AppError::Conflict { .. }) => {
                tracing::debug!(id, url = %entry.url, "Lost creation race, returning winner");
                self.repository
                    .find_by_url(&entry.url)
                    .await?
                    .map(|winner| (winner, false))
                    .ok_or_else(|| {
                        AppError::conflict(
                            "URL conflict could not be resolved",
                            json!({ "url": entry.url }),
                        )
                    })
            }
            Err(e) => Err(e),
        }
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.request_timeout, future)
            .await
            .map_err(|_| {
                AppError::timeout(
                    "Request deadline exceeded",
                    json!({
                        "operation": operation,
                        "timeout_ms": self.request_timeout.as_millis() as u64,
                    }),
                )
            })?
    }
}
