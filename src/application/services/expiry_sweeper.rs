//! Periodic removal of expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::ShortenerService;

/// Calls [`ShortenerService::sweep_expired`] every `period` until the task is dropped.
///
/// Failures are logged and the loop continues with the next tick.
pub async fn run_expiry_sweeper(service: Arc<ShortenerService>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // First tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match service.sweep_expired().await {
            Ok(0) => tracing::debug!("Expiry sweep found nothing to remove"),
            Ok(removed) => tracing::debug!(removed, "Expiry sweep finished"),
            Err(e) => tracing::warn!(error = %e, "Expiry sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::HostResolver;
    use crate::config::TenantConfig;
    use crate::domain::entities::{ShortenedEntry, now_millis};
    use crate::domain::repositories::UrlRepository;
    use crate::infrastructure::persistence::InMemoryUrlRepository;
    use crate::utils::hash_id::HashIdCodec;
    use crate::utils::url_validator::UrlValidator;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        repo.save(ShortenedEntry {
            id: 1,
            url: "https://old.example.com".to_string(),
            valid_from: None,
            valid_till: Some(now_millis() - 1_000),
        })
        .await
        .unwrap();
        repo.save(ShortenedEntry {
            id: 2,
            url: "https://live.example.com".to_string(),
            valid_from: None,
            valid_till: None,
        })
        .await
        .unwrap();

        let service = Arc::new(ShortenerService::new(
            repo.clone(),
            HashIdCodec::new("sweeper-salt", 3).unwrap(),
            UrlValidator::default(),
            HostResolver::new(
                TenantConfig {
                    host_name: "https://s.example.com".to_string(),
                    is_multi_instance: false,
                    state_level_tenant_id: "pb".to_string(),
                    state_level_tenant_id_length: 2,
                    ui_app_host_map: HashMap::new(),
                    strict: false,
                },
                "",
            ),
            Duration::from_secs(1),
        ));

        let handle = tokio::spawn(run_expiry_sweeper(service, Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(!repo.exists(1).await.unwrap());
        assert!(repo.exists(2).await.unwrap());
    }
}
