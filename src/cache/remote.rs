//! External key-value tier.
//!
//! The only production implementation is Redis; tests plug in their own
//! store through the same trait.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;

/// Minimal string key-value store with expiry and counters
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Read a value, `None` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value that expires after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Atomically increment an integer key, creating it at 0 first
    async fn incr(&self, key: &str) -> Result<i64>;
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis. The connection manager reconnects on its own.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .with_context(|| format!("Invalid Redis URL: {}", redis_url))?;
        let connection = client
            .get_connection_manager()
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait]
impl RemoteStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("Redis GET {} failed", key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        redis::cmd("SETEX")
            .arg(key)
            .arg(seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .with_context(|| format!("Redis SETEX {} failed", key))
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection.clone();
        redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("Redis INCR {} failed", key))
    }
}
