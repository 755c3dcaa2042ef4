/// Rendered page caching
///
/// The index listing is served from a whole-page cache. Entries live for
/// the configured TTL and are not invalidated by data changes; `clear`
/// drops everything at once.
///
/// Backends:
/// - `MemoryPageCache`: moka, per process
/// - `RedisPageCache`: shared between workers and instances
pub mod memory;
pub mod redis;

pub use self::memory::MemoryPageCache;
pub use self::redis::RedisPageCache;

use crate::error::Result;
use crate::middleware::SessionUser;

#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, body: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Cache key for a rendered page. Pages show the viewer's name in the
/// header, so each viewer gets their own entry.
pub fn page_key(prefix: &str, path_and_query: &str, viewer: Option<&SessionUser>) -> String {
    match viewer {
        Some(user) => format!("{}:u{}:{}", prefix, user.id, path_and_query),
        None => format!("{}:anon:{}", prefix, path_and_query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_vary_by_viewer_and_query() {
        let user = SessionUser {
            id: 7,
            username: "leo".into(),
        };
        assert_eq!(page_key("index", "/", None), "index:anon:/");
        assert_eq!(page_key("index", "/?page=2", Some(&user)), "index:u7:/?page=2");
    }
}
