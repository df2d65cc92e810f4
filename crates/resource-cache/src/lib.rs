//! Cache-aside resource retrieval
//!
//! Composes the tiered cache and the remote fetcher into one
//! retrieve-or-fetch-and-populate operation: a cached value is returned as
//! is, a miss triggers a fetch whose result populates the cache before being
//! handed to the caller, and a failed fetch leaves the cache untouched.

use chrono::{DateTime, Utc};
use remote_fetcher::{Fetchable, RemoteFetcher, Result};
use tiered_cache::{Cacheable, DiskCache, MemoryCache, MemoryStore};
use tracing::warn;

/// Identity of a fetchable resource: where it lives remotely and which key
/// it caches under. Lets callers drive the cache with domain objects instead
/// of raw URL and key pairs.
pub trait RemoteResource {
    fn remote_url(&self) -> String;
    fn cache_key(&self) -> String;
}

/// A cache that falls back to the network.
///
/// Concurrent misses on the same key each issue their own fetch; there is no
/// single-flight coalescing.
pub struct ResourceCache<V, M = MemoryCache<V>> {
    cache: DiskCache<V, M>,
    fetcher: RemoteFetcher,
}

impl<V> ResourceCache<V>
where
    V: Cacheable + Fetchable + Clone + Send + Sync + 'static,
{
    /// Create a resource cache named `name` rooted at `root_path`, with
    /// default cache and fetcher settings.
    pub fn new(name: &str, root_path: impl AsRef<std::path::Path>) -> Self {
        Self::with_parts(DiskCache::new(name, root_path), RemoteFetcher::new())
    }
}

impl<V, M> ResourceCache<V, M>
where
    V: Cacheable + Fetchable + Clone + Send + Sync + 'static,
    M: MemoryStore<V>,
{
    /// Compose a resource cache from caller-configured parts.
    pub fn with_parts(cache: DiskCache<V, M>, fetcher: RemoteFetcher) -> Self {
        Self { cache, fetcher }
    }

    /// Return the value cached under `key`, or fetch it from `url`, cache
    /// it, and return it.
    ///
    /// A fetch failure propagates unchanged and writes nothing. A cache
    /// write failure after a successful fetch is logged but does not stop
    /// the fetched value from being returned; the next miss simply fetches
    /// again.
    pub async fn fetch_or_retrieve(&self, key: &str, url: &str) -> Result<V> {
        if let Some(cached) = self.cache.get(key).await {
            return Ok(cached);
        }

        let fetched = self.fetcher.fetch::<V>(url).await?;

        if !self.cache.put(key, fetched.clone()).await {
            warn!(key, url, "failed to cache fetched resource");
        }

        Ok(fetched)
    }

    /// [`fetch_or_retrieve`] driven by a resource descriptor.
    ///
    /// [`fetch_or_retrieve`]: ResourceCache::fetch_or_retrieve
    pub async fn fetch(&self, resource: &impl RemoteResource) -> Result<V> {
        self.fetch_or_retrieve(&resource.cache_key(), &resource.remote_url())
            .await
    }

    /// Drop every cached entry.
    pub async fn purge(&self) -> bool {
        self.cache.remove_all().await
    }

    /// Drop every entry last used strictly before `cutoff`.
    pub async fn trim_before(&self, cutoff: DateTime<Utc>) {
        self.cache.trim_before(cutoff).await
    }
}
