//! Redis implementation of the URL repository.
//!
//! # Key Layout
//!
//! - `url:id` - id sequence advanced with `INCR`
//! - `url:data` - hash, field `url:{id}` → entry JSON
//! - `url:index` - hash, field `{long url}` → owning id
//!
//! Saves run as a single Lua script: the index claim and the data write either both
//! land or neither does. An index field whose owner has no data is stale and is taken
//! over by the next save of that URL.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use serde_json::json;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::domain::entities::ShortenedEntry;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

const SEQUENCE_KEY: &str = "url:id";
const DATA_KEY: &str = "url:data";
const INDEX_KEY: &str = "url:index";
const HEALTH_KEY: &str = "url:health:check";

/// KEYS: index, data. ARGV: url, id, data field, payload.
///
/// Returns 0 when the entry was written, otherwise the id that owns the URL.
static SAVE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local owner = redis.call('HGET', KEYS[1], ARGV[1])
if owner and owner ~= ARGV[2] and redis.call('HEXISTS', KEYS[2], 'url:' .. owner) == 1 then
    return tonumber(owner)
end

local previous = redis.call('HGET', KEYS[2], ARGV[3])
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
redis.call('HSET', KEYS[2], ARGV[3], ARGV[4])

if previous then
    local ok, decoded = pcall(cjson.decode, previous)
    local url = ok and decoded['url']
    if url and url ~= ARGV[1] and redis.call('HGET', KEYS[1], url) == ARGV[2] then
        redis.call('HDEL', KEYS[1], url)
    end
end

return 0
"#,
    )
});

fn data_field(id: i64) -> String {
    format!("url:{id}")
}

fn decode_entry(raw: &str) -> Result<ShortenedEntry, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::storage(
            "Corrupted entry in Redis",
            json!({ "reason": e.to_string() }),
        )
    })
}

/// Redis repository using a shared [`ConnectionManager`].
pub struct RedisUrlRepository {
    conn: ConnectionManager,
}

impl RedisUrlRepository {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the URL is invalid, the connection cannot be
    /// established, or the PING fails.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        let mut ping_conn = manager.clone();
        ping_conn.ping::<()>().await?;

        info!("✓ Connected to Redis");
        Ok(Self::new(manager))
    }

    async fn load(&self, id: i64) -> Result<Option<ShortenedEntry>, AppError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.hget(DATA_KEY, data_field(id)).await?;

        raw.as_deref().map(decode_entry).transpose()
    }
}

#[async_trait]
impl UrlRepository for RedisUrlRepository {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn next_id(&self) -> Result<i64, AppError> {
        let mut conn = self.conn.clone();
        let id: i64 = conn.incr(SEQUENCE_KEY, 1).await?;
        Ok(id)
    }

    async fn save(&self, entry: ShortenedEntry) -> Result<(), AppError> {
        let payload = serde_json::to_string(&entry).map_err(|e| {
            AppError::internal("Failed to encode entry", json!({ "reason": e.to_string() }))
        })?;

        let mut conn = self.conn.clone();
        let owner: i64 = SAVE_SCRIPT
            .key(INDEX_KEY)
            .key(DATA_KEY)
            .arg(&entry.url)
            .arg(entry.id)
            .arg(data_field(entry.id))
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;

        if owner != 0 {
            return Err(AppError::conflict(
                "URL is already shortened",
                json!({ "url": entry.url, "existing_id": owner }),
            ));
        }

        debug!(id = entry.id, url = %entry.url, "Entry saved");
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<ShortenedEntry, AppError> {
        self.load(id)
            .await?
            .ok_or_else(|| AppError::not_found("URL entry not found", json!({ "id": id })))
    }

    /// An index field whose owner has no data reads as absent.
    async fn find_by_url(&self, url: &str) -> Result<Option<ShortenedEntry>, AppError> {
        let mut conn = self.conn.clone();
        let owner: Option<i64> = conn.hget(INDEX_KEY, url).await?;

        match owner {
            Some(id) => self.load(id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let Some(entry) = self.load(id).await? else {
            return Err(AppError::not_found(
                "URL entry not found",
                json!({ "id": id }),
            ));
        };

        let mut conn = self.conn.clone();
        let removed: i64 = conn.hdel(DATA_KEY, data_field(id)).await?;
        if removed == 0 {
            return Err(AppError::not_found(
                "URL entry not found",
                json!({ "id": id }),
            ));
        }

        let owner: Option<i64> = conn.hget(INDEX_KEY, &entry.url).await?;
        if owner == Some(id) {
            let _: i64 = conn.hdel(INDEX_KEY, &entry.url).await?;
        }

        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.hexists(DATA_KEY, data_field(id)).await?;
        Ok(exists)
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64, AppError> {
        let mut conn = self.conn.clone();
        let all: HashMap<String, String> = conn.hgetall(DATA_KEY).await?;

        let mut removed = 0;
        for (field, raw) in all {
            let entry = match decode_entry(&raw) {
                Ok(entry) => entry,
                Err(_) => {
                    warn!(field = %field, "Skipping undecodable entry during sweep");
                    continue;
                }
            };

            if !entry.is_expired_at(now) {
                continue;
            }

            let deleted: i64 = conn.hdel(DATA_KEY, &field).await?;
            if deleted > 0 {
                let owner: Option<i64> = conn.hget(INDEX_KEY, &entry.url).await?;
                if owner == Some(entry.id) {
                    let _: i64 = conn.hdel(INDEX_KEY, &entry.url).await?;
                }
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let mut conn = self.conn.clone();
        let count: u64 = conn.hlen(DATA_KEY).await?;
        Ok(count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let mut conn = self.conn.clone();

        conn.ping::<()>().await.map_err(|e| {
            AppError::storage(
                "Redis PING failed",
                json!({ "check": "connectivity", "reason": e.to_string() }),
            )
        })?;

        let _: () = conn.set_ex(HEALTH_KEY, "ok", 10).await.map_err(|e| {
            AppError::storage(
                "Redis write check failed",
                json!({ "check": "write", "reason": e.to_string() }),
            )
        })?;
        let _: i64 = conn.del(HEALTH_KEY).await?;

        Ok(())
    }
}
