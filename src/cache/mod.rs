//! Two-tier read-through cache.
//!
//! # Lookup order
//!
//! ```text
//! get_or_fetch(key)
//!   ├── memory (TtlCache)        hit -> CacheTier::Memory
//!   ├── remote (RemoteStore)     hit -> CacheTier::Remote, fills memory
//!   └── fetch()                  ok  -> CacheTier::Fresh, fills both
//! ```
//!
//! Remote failures never fail a lookup: they are logged and treated as a miss.

pub mod memory;
pub mod remote;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CacheSettings;

pub use memory::TtlCache;
pub use remote::{RedisStore, RemoteStore};

/// Connect the configured remote store, if any.
///
/// Connection failures are logged and yield `None` so callers run memory-only.
pub async fn connect_remote(settings: &CacheSettings) -> Option<Arc<dyn RemoteStore>> {
    let url = settings.redis_url.as_deref()?;
    match RedisStore::connect(url).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("Redis unavailable, using memory cache only: {:#}", e);
            None
        }
    }
}

/// Which tier answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Remote,
    Fresh,
}

/// A value together with the tier that produced it
#[derive(Debug, Clone)]
pub struct Cached<V> {
    pub value: V,
    pub tier: CacheTier,
}

/// Memory cache backed by an optional remote store, sharing one TTL
pub struct TieredCache<V> {
    memory: TtlCache<V>,
    remote: Option<Arc<dyn RemoteStore>>,
    prefix: String,
}

impl<V> TieredCache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Memory-only cache
    pub fn new(ttl: Duration, prefix: impl Into<String>) -> Self {
        Self {
            memory: TtlCache::new(ttl),
            remote: None,
            prefix: prefix.into(),
        }
    }

    /// Add a remote tier
    pub fn with_remote(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(store);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.memory.ttl()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Key used in the remote store
    pub fn remote_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Return a cached value or run `fetch` and cache its result.
    ///
    /// Fetch errors are returned and nothing is cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Cached<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.memory.get(key) {
            debug!(key, "Memory cache hit");
            return Ok(Cached {
                value,
                tier: CacheTier::Memory,
            });
        }

        if let Some(value) = self.remote_get(key).await {
            debug!(key, "Remote cache hit");
            let value = self.memory.insert_if_absent(key, value);
            return Ok(Cached {
                value,
                tier: CacheTier::Remote,
            });
        }

        let fetched = fetch().await?;
        let value = self.memory.insert_if_absent(key, fetched);
        self.remote_set(key, &value).await;

        Ok(Cached {
            value,
            tier: CacheTier::Fresh,
        })
    }

    async fn remote_get(&self, key: &str) -> Option<V> {
        let store = self.remote.as_ref()?;
        let remote_key = self.remote_key(key);

        match store.get(&remote_key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key = %remote_key, "Discarding undecodable {} entry: {}", store.name(), e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %remote_key, "{} read failed: {:#}", store.name(), e);
                None
            }
        }
    }

    async fn remote_set(&self, key: &str, value: &V) {
        let Some(store) = self.remote.as_ref() else {
            return;
        };
        let remote_key = self.remote_key(key);

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %remote_key, "Failed to serialize cache entry: {}", e);
                return;
            }
        };

        if let Err(e) = store.set_ex(&remote_key, &raw, self.ttl()).await {
            warn!(key = %remote_key, "{} write failed: {:#}", store.name(), e);
        }
    }
}
