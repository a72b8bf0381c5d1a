//! Page view counters.
//!
//! Counts live in the remote store when one is configured (`INCR` is atomic
//! there), otherwise in process memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::cache::RemoteStore;
use crate::content::validate_slug;

/// Read/increment counter keyed by slug
pub struct ViewCounter {
    prefix: String,
    store: Option<Arc<dyn RemoteStore>>,
    local: Mutex<HashMap<String, u64>>,
}

impl ViewCounter {
    /// Memory-only counter
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store: None,
            local: Mutex::new(HashMap::new()),
        }
    }

    /// Counter backed by a remote store
    pub fn with_store(prefix: impl Into<String>, store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(prefix)
        }
    }

    /// Storage key for a slug
    pub fn key(&self, slug: &str) -> String {
        format!("{}:views:{}", self.prefix, slug)
    }

    /// Record a view and return the new total
    pub async fn increment(&self, slug: &str) -> Result<u64> {
        validate_slug(slug)?;
        let key = self.key(slug);

        if let Some(store) = &self.store {
            match store.incr(&key).await {
                Ok(count) => return Ok(count.max(0) as u64),
                Err(e) => tracing::warn!(%key, "{} INCR failed, counting locally: {:#}", store.name(), e),
            }
        }

        let mut local = self.local.lock().unwrap_or_else(|p| p.into_inner());
        let count = local.entry(key).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Current total without incrementing; unknown slugs have 0 views
    pub async fn get(&self, slug: &str) -> Result<u64> {
        validate_slug(slug)?;
        let key = self.key(slug);

        if let Some(store) = &self.store {
            match store.get(&key).await {
                Ok(Some(raw)) => {
                    return Ok(raw.trim().parse().unwrap_or_else(|e| {
                        tracing::warn!(%key, "Unparsable view count {:?}, reporting 0: {}", raw, e);
                        0
                    }))
                }
                Ok(None) => return Ok(0),
                Err(e) => tracing::warn!(%key, "{} GET failed, reading local count: {:#}", store.name(), e),
            }
        }

        let local = self.local.lock().unwrap_or_else(|p| p.into_inner());
        Ok(local.get(&key).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_counter() {
        let counter = ViewCounter::new("folio");
        assert_eq!(counter.get("hello").await.unwrap(), 0);
        assert_eq!(counter.increment("hello").await.unwrap(), 1);
        assert_eq!(counter.increment("hello").await.unwrap(), 2);
        assert_eq!(counter.increment("other").await.unwrap(), 1);
        assert_eq!(counter.get("hello").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let counter = ViewCounter::new("folio");
        assert!(counter.increment("../etc").await.is_err());
        assert!(counter.get("").await.is_err());
    }

    #[test]
    fn test_key_format() {
        let counter = ViewCounter::new("site");
        assert_eq!(counter.key("hello-world"), "site:views:hello-world");
    }
}
