use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::debug;

use super::PageCache;
use crate::error::Result;

const KEY_PREFIX: &str = "yatube:page:";
const SCAN_BATCH: usize = 200;

/// Redis-backed page cache. All keys live under `yatube:page:` so `clear`
/// never touches anything else in the database.
#[derive(Clone)]
pub struct RedisPageCache {
    redis: ConnectionManager,
    ttl: Duration,
}

impl RedisPageCache {
    pub fn new(redis: ConnectionManager, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    pub async fn connect(url: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(manager, ttl))
    }

    fn key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

#[async_trait::async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        let body: Option<String> = conn.get(Self::key(key)).await?;
        Ok(body)
    }

    async fn set(&self, key: &str, body: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        let ttl_secs = self.ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(Self::key(key), body, ttl_secs)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        let pattern = format!("{}*", KEY_PREFIX);
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                conn.del::<_, ()>(keys).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(removed, "Page cache cleared");
        Ok(())
    }
}
