//! In-memory tier

use async_trait::async_trait;
use moka::future::Cache;

const DEFAULT_CAPACITY: u64 = 10_000;

/// Bounded, thread-safe key-value store used as the fast tier of the cache.
///
/// Deliberately narrow: no enumeration and no observable eviction policy, so
/// implementations are free to drop entries under pressure. Injectable so
/// tests can substitute a deterministic map.
#[async_trait]
pub trait MemoryStore<V: Clone + Send + Sync + 'static>: Send + Sync {
    async fn set(&self, key: &str, value: V);
    async fn get(&self, key: &str) -> Option<V>;
    async fn remove(&self, key: &str);
    async fn remove_all(&self);
}

/// Default memory tier backed by a bounded moka cache.
pub struct MemoryCache<V> {
    cache: Cache<String, V>,
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a memory cache with the default capacity (10 000 entries).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a memory cache bounded to `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }
}

impl<V> Default for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> MemoryStore<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn set(&self, key: &str, value: V) {
        self.cache.insert(key.to_owned(), value).await;
    }

    async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    async fn remove(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    async fn remove_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryCache::new();
        store.set("a", "one".to_string()).await;
        assert_eq!(store.get("a").await, Some("one".to_string()));
        assert_eq!(store.get("b").await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryCache::new();
        store.set("a", 1u32).await;
        store.set("a", 2u32).await;
        assert_eq!(store.get("a").await, Some(2));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryCache::new();
        store.set("a", 1u32).await;
        store.remove("a").await;
        assert_eq!(store.get("a").await, None);

        // Removing an absent key is a no-op
        store.remove("b").await;
    }

    #[tokio::test]
    async fn test_remove_all() {
        let store = MemoryCache::new();
        store.set("a", 1u32).await;
        store.set("b", 2u32).await;
        store.remove_all().await;
        assert_eq!(store.get("a").await, None);
        assert_eq!(store.get("b").await, None);
    }
}
