//! In-process implementation of the URL repository.
//!
//! Backs local runs (`STORAGE_BACKEND=memory`) and the HTTP test suite. Entries live in
//! a [`DashMap`] keyed by id, with a second map from long URL to owning id enforcing
//! URL uniqueness the way a unique index would.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::ShortenedEntry;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// DashMap-backed repository with its own atomic id sequence.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    sequence: AtomicI64,
    entries: DashMap<i64, ShortenedEntry>,
    index: DashMap<String, i64>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn next_id(&self) -> Result<i64, AppError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn save(&self, entry: ShortenedEntry) -> Result<(), AppError> {
        let id = entry.id;
        let url = entry.url.clone();

        // The entry is inserted while the index slot is still locked, so an owner seen
        // through the index always has its entry in place.
        let previous = match self.index.entry(url.clone()) {
            Entry::Occupied(mut owner) => {
                let current = *owner.get();
                if current != id && self.entries.contains_key(&current) {
                    return Err(AppError::conflict(
                        "URL is already shortened",
                        json!({ "url": url, "existing_id": current }),
                    ));
                }
                owner.insert(id);
                self.entries.insert(id, entry)
            }
            Entry::Vacant(slot) => {
                let _owner = slot.insert(id);
                self.entries.insert(id, entry)
            }
        };

        if let Some(previous) = previous
            && previous.url != url
        {
            self.index.remove_if(&previous.url, |_, owner| *owner == id);
        }

        Ok(())
    }

    async fn get(&self, id: i64) -> Result<ShortenedEntry, AppError> {
        self.entries
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found("URL entry not found", json!({ "id": id })))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ShortenedEntry>, AppError> {
        let Some(id) = self.index.get(url).map(|owner| *owner.value()) else {
            return Ok(None);
        };

        Ok(self.entries.get(&id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let Some((_, removed)) = self.entries.remove(&id) else {
            return Err(AppError::not_found(
                "URL entry not found",
                json!({ "id": id }),
            ));
        };

        self.index.remove_if(&removed.url, |_, owner| *owner == id);
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.entries.contains_key(&id))
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64, AppError> {
        let expired: Vec<i64> = self
            .entries
            .iter()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in expired {
            if let Some((_, entry)) = self.entries.remove_if(&id, |_, e| e.is_expired_at(now)) {
                self.index.remove_if(&entry.url, |_, owner| *owner == id);
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.entries.len() as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn entry(id: i64, url: &str, valid_till: Option<i64>) -> ShortenedEntry {
        ShortenedEntry {
            id,
            url: url.to_string(),
            valid_from: None,
            valid_till,
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one() {
        let repo = InMemoryUrlRepository::new();

        assert_eq!(repo.next_id().await.unwrap(), 1);
        assert_eq!(repo.next_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_takes_over_dangling_index_entry() {
        let repo = InMemoryUrlRepository::new();
        repo.index.insert("https://example.com/dangling".to_string(), 5);

        repo.save(entry(6, "https://example.com/dangling", None))
            .await
            .unwrap();

        let found = repo
            .find_by_url("https://example.com/dangling")
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(6));
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_same_url_have_one_owner() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let mut handles = vec![];

        for id in 1..=16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.save(entry(id, "https://example.com/contended", None))
                    .await
                    .is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_next_id_distinct() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let mut handles = vec![];

        for _ in 0..64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move { repo.next_id().await.unwrap() }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 64);
        assert_eq!(ids.iter().max(), Some(&64));
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = InMemoryUrlRepository::new();
        repo.save(entry(1, "https://example.com", None)).await.unwrap();

        let found = repo.get(1).await.unwrap();
        assert_eq!(found.url, "https://example.com");
        assert_eq!(
            repo.find_by_url("https://example.com").await.unwrap(),
            Some(found)
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryUrlRepository::new();

        let err = repo.get(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_save_same_url_other_id_conflicts() {
        let repo = InMemoryUrlRepository::new();
        repo.save(entry(1, "https://example.com", None)).await.unwrap();

        let err = repo
            .save(entry(2, "https://example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(!repo.exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_is_upsert_by_id() {
        let repo = InMemoryUrlRepository::new();
        repo.save(entry(1, "https://example.com", None)).await.unwrap();
        repo.save(entry(1, "https://example.com", Some(500)))
            .await
            .unwrap();

        assert_eq!(repo.get(1).await.unwrap().valid_till, Some(500));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_retires_id() {
        let repo = InMemoryUrlRepository::new();
        let id = repo.next_id().await.unwrap();
        repo.save(entry(id, "https://example.com", None)).await.unwrap();

        repo.delete(id).await.unwrap();

        assert!(!repo.exists(id).await.unwrap());
        assert!(repo.find_by_url("https://example.com").await.unwrap().is_none());
        assert!(matches!(
            repo.delete(id).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
        assert_eq!(repo.next_id().await.unwrap(), id + 1);
    }

    #[tokio::test]
    async fn test_sweep_expired_removes_only_expired() {
        let repo = InMemoryUrlRepository::new();
        let now = 1_000_000;

        repo.save(entry(1, "https://a.example.com", Some(now - 1)))
            .await
            .unwrap();
        repo.save(entry(2, "https://b.example.com", Some(now + 60_000)))
            .await
            .unwrap();
        repo.save(entry(3, "https://c.example.com", None)).await.unwrap();

        assert_eq!(repo.sweep_expired(now).await.unwrap(), 1);
        assert_eq!(repo.sweep_expired(now).await.unwrap(), 0);

        assert!(!repo.exists(1).await.unwrap());
        assert!(repo.exists(2).await.unwrap());
        assert!(repo.exists(3).await.unwrap());
        assert!(
            repo.find_by_url("https://a.example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
