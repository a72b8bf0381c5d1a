//! In-process stand-ins for Redis and the Unsplash API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use folio::cache::RemoteStore;
use folio::unsplash::client::{PhotoLinks, PhotoUrls, PhotoUser};
use folio::unsplash::{PhotoId, PhotoSource, UnsplashPhoto};

/// HashMap-backed remote store that records TTLs
#[derive(Default)]
pub struct MemoryStore {
    pub values: Mutex<HashMap<String, String>>,
    pub ttls: Mutex<HashMap<String, Duration>>,
}

impl MemoryStore {
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.put(key, value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut values = self.values.lock().unwrap();
        let next = values
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        values.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}

/// Remote store whose every call fails, like an unreachable Redis
pub struct FailingStore;

#[async_trait]
impl RemoteStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        anyhow::bail!("connection refused")
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        anyhow::bail!("connection refused")
    }
}

/// Photo source that counts calls and can be told to fail
#[derive(Default)]
pub struct FakeUnsplash {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeUnsplash {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for FakeUnsplash {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_photo(&self, id: &PhotoId) -> Result<UnsplashPhoto> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("Unsplash API error for photo {}: HTTP 503", id);
        }
        Ok(sample_photo(id.as_str()))
    }
}

pub fn sample_photo(id: &str) -> UnsplashPhoto {
    UnsplashPhoto {
        id: id.to_string(),
        width: 4000,
        height: 3000,
        color: Some("#26402f".to_string()),
        blur_hash: Some("LKO2?U%2Tw=w]~RBVZRi};RPxuwH".to_string()),
        alt_description: Some("green trees near lake".to_string()),
        description: None,
        urls: PhotoUrls {
            raw: format!("https://images.unsplash.com/{}?raw", id),
            full: format!("https://images.unsplash.com/{}?full", id),
            regular: format!("https://images.unsplash.com/{}?w=1080", id),
            small: format!("https://images.unsplash.com/{}?w=400", id),
            thumb: format!("https://images.unsplash.com/{}?w=200", id),
        },
        user: PhotoUser {
            name: "Jane Doe".to_string(),
            username: Some("jane".to_string()),
            links: Some(PhotoLinks {
                html: "https://unsplash.com/@jane".to_string(),
            }),
        },
        links: None,
    }
}
