//! Disk-backed cache coordinating the memory and disk tiers

use crate::codec::Cacheable;
use crate::memory::{MemoryCache, MemoryStore};
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Reserved directory segment interposed between the caller-supplied root and
/// the cache name, so an empty name can never resolve to the root itself and
/// a full purge can never delete unrelated files.
const CACHE_SUBDIR: &str = "tiered-cache";

/// A named, disk-backed cache with an in-memory mirror of recently accessed
/// entries.
///
/// Every value lives in one file under the cache directory; the file's
/// modification time doubles as the recency signal for [`trim_before`].
/// Reads may overlap each other, while `put`, `remove`, `remove_all` and
/// `trim_before` run as instance-wide exclusive barriers: a mutation waits
/// for every earlier operation to finish and holds off every later one. Disk
/// failures never surface as errors, only as misses or a `false` result.
///
/// Construction must happen inside a Tokio runtime: the cache directory is
/// created on a background task that holds the write barrier, so operations
/// issued immediately after construction queue up behind it.
///
/// Two instances sharing a name and root race undetected; giving each name
/// one owner is the caller's responsibility.
///
/// [`trim_before`]: DiskCache::trim_before
pub struct DiskCache<V, M = MemoryCache<V>> {
    memory: M,
    cache_dir: PathBuf,
    name: String,
    gate: Arc<RwLock<()>>,
    _value: PhantomData<V>,
}

impl<V> DiskCache<V>
where
    V: Cacheable + Clone + Send + Sync + 'static,
{
    /// Create a cache named `name` rooted at `root_path`, with the default
    /// moka-backed memory tier.
    pub fn new(name: &str, root_path: impl AsRef<Path>) -> Self {
        Self::with_store(name, root_path, MemoryCache::new())
    }
}

impl<V, M> DiskCache<V, M>
where
    V: Cacheable + Clone + Send + Sync + 'static,
    M: MemoryStore<V>,
{
    /// Create a cache with a caller-supplied memory tier.
    pub fn with_store(name: &str, root_path: impl AsRef<Path>, memory: M) -> Self {
        let cache_dir =
            blob_store::encoded_path(name, &root_path.as_ref().join(CACHE_SUBDIR));
        let gate = Arc::new(RwLock::new(()));

        // Directory creation is fire-and-forget, but it holds the write
        // barrier so nothing runs against a missing cache directory.
        let init = gate
            .clone()
            .try_write_owned()
            .expect("gate is unshared at construction");
        let dir = cache_dir.clone();
        tokio::spawn(async move {
            blob_store::create_directory(&dir).await;
            drop(init);
        });

        Self {
            memory,
            cache_dir,
            name: name.to_owned(),
            gate,
            _value: PhantomData,
        }
    }

    /// The cache's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory holding this cache's blobs.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        blob_store::encoded_path(key, &self.cache_dir)
    }

    /// Look up `key`, checking the memory tier first and falling back to
    /// disk. A memory hit refreshes the blob's modification time so the
    /// entry still counts as recently used; a disk hit populates the memory
    /// tier. A missing or undecodable blob is a miss, not an error.
    pub async fn get(&self, key: &str) -> Option<V> {
        let _read = self.gate.read().await;
        let path = self.blob_path(key);

        if let Some(value) = self.memory.get(key).await {
            debug!(name = %self.name, key, "memory hit");
            blob_store::set_modified_time(&path, Utc::now()).await;
            return Some(value);
        }

        let bytes = blob_store::read(&path).await?;
        match V::from_cached(&bytes) {
            Ok(value) => {
                debug!(name = %self.name, key, "disk hit");
                self.memory.set(key, value.clone()).await;
                Some(value)
            }
            Err(err) => {
                warn!(name = %self.name, key, error = %err, "failed to decode cached blob");
                None
            }
        }
    }

    /// Store `value` under `key` in both tiers. Returns false if encoding or
    /// the disk write fails; the memory tier keeps the value either way,
    /// since it is only a performance mirror of the durable tier.
    pub async fn put(&self, key: &str, value: V) -> bool {
        let _write = self.gate.write().await;

        self.memory.set(key, value.clone()).await;

        let bytes = match value.to_cached() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(name = %self.name, key, error = %err, "failed to encode value for disk");
                return false;
            }
        };

        blob_store::write(&bytes, &self.blob_path(key)).await
    }

    /// Remove `key` from both tiers. Success reflects only the disk
    /// deletion; removing an absent entry succeeds.
    pub async fn remove(&self, key: &str) -> bool {
        let _write = self.gate.write().await;

        self.memory.remove(key).await;
        blob_store::delete(&self.blob_path(key)).await
    }

    /// Remove every entry. The cache directory is deleted and recreated; the
    /// memory tier is cleared only once the disk purge has succeeded, so a
    /// failed purge leaves both tiers as they were.
    pub async fn remove_all(&self) -> bool {
        let _write = self.gate.write().await;

        let purged = blob_store::delete(&self.cache_dir).await;
        if purged {
            blob_store::create_directory(&self.cache_dir).await;
            self.memory.remove_all().await;
        }
        purged
    }

    /// Delete every blob whose modification time is strictly before
    /// `cutoff`. The memory tier has no enumeration, so it is cleared in
    /// full. Deletions are independent; an interrupted sweep simply leaves
    /// some stale blobs for the next one.
    pub async fn trim_before(&self, cutoff: DateTime<Utc>) {
        let _write = self.gate.write().await;

        self.memory.remove_all().await;

        for path in blob_store::enumerate(&self.cache_dir).await {
            if let Some(modified) = blob_store::modified_time(&path).await {
                if modified < cutoff {
                    debug!(name = %self.name, path = %path.display(), "trimming stale blob");
                    blob_store::delete(&path).await;
                }
            }
        }
    }
}
