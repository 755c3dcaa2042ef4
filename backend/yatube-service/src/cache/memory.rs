use moka::future::Cache;
use std::time::Duration;

use super::PageCache;
use crate::error::Result;

/// In-process page cache with a fixed time-to-live.
#[derive(Clone)]
pub struct MemoryPageCache {
    inner: Cache<String, String>,
}

impl MemoryPageCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait::async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: &str, body: &str) -> Result<()> {
        self.inner.insert(key.to_string(), body.to_string()).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_until_cleared() {
        let cache = MemoryPageCache::new(Duration::from_secs(60), 100);
        assert_eq!(cache.get("index:anon:/").await.unwrap(), None);

        cache.set("index:anon:/", "<html>").await.unwrap();
        assert_eq!(
            cache.get("index:anon:/").await.unwrap().as_deref(),
            Some("<html>")
        );

        cache.clear().await.unwrap();
        assert_eq!(cache.get("index:anon:/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = MemoryPageCache::new(Duration::from_millis(50), 100);
        cache.set("k", "v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
