#![allow(dead_code)]

use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hashid_shortener::application::services::{HostResolver, ShortenerService};
use hashid_shortener::config::TenantConfig;
use hashid_shortener::domain::entities::{NewEntry, ShortenedEntry};
use hashid_shortener::domain::repositories::UrlRepository;
use hashid_shortener::infrastructure::persistence::InMemoryUrlRepository;
use hashid_shortener::routes::build_router;
use hashid_shortener::state::AppState;
use hashid_shortener::utils::hash_id::HashIdCodec;
use hashid_shortener::utils::url_validator::UrlValidator;

pub const SALT: &str = "test-salt";
pub const MIN_LENGTH: usize = 3;
pub const CONTEXT_PATH: &str = "/url-shortening";
pub const HOST: &str = "https://s.example.com";

pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<InMemoryUrlRepository>,
    pub codec: HashIdCodec,
}

impl TestApp {
    /// Stores an entry directly and returns its token.
    pub async fn seed(
        &self,
        url: &str,
        valid_from: Option<i64>,
        valid_till: Option<i64>,
    ) -> String {
        let id = self.repository.next_id().await.unwrap();
        let entry = ShortenedEntry::new(
            id,
            NewEntry {
                url: url.to_string(),
                valid_from,
                valid_till,
            },
        );
        self.repository.save(entry).await.unwrap();
        self.codec.encode(id).unwrap()
    }
}

pub fn single_instance_tenant() -> TenantConfig {
    TenantConfig {
        host_name: HOST.to_string(),
        is_multi_instance: false,
        state_level_tenant_id: "pb".to_string(),
        state_level_tenant_id_length: 2,
        ui_app_host_map: HashMap::new(),
        strict: false,
    }
}

pub fn multi_instance_tenant() -> TenantConfig {
    let mut ui_app_host_map = HashMap::new();
    ui_app_host_map.insert("pb".to_string(), "https://pb.example.com/".to_string());
    ui_app_host_map.insert("in".to_string(), "https://in.example.com".to_string());

    TenantConfig {
        host_name: HOST.to_string(),
        is_multi_instance: true,
        state_level_tenant_id: "pb".to_string(),
        state_level_tenant_id_length: 2,
        ui_app_host_map,
        strict: false,
    }
}

pub fn create_test_app_with(tenant: TenantConfig, context_path: &str) -> TestApp {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let codec = HashIdCodec::new(SALT, MIN_LENGTH).unwrap();

    let service = ShortenerService::new(
        repository.clone(),
        codec.clone(),
        UrlValidator::new(false),
        HostResolver::new(tenant, context_path),
        Duration::from_secs(5),
    );

    let app = build_router(AppState::new(Arc::new(service)), context_path);

    TestApp {
        server: TestServer::new(app).unwrap(),
        repository,
        codec,
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(single_instance_tenant(), CONTEXT_PATH)
}

/// Current time in epoch milliseconds shifted by `offset_ms`.
pub fn millis_from_now(offset_ms: i64) -> i64 {
    hashid_shortener::domain::entities::now_millis() + offset_ms
}
