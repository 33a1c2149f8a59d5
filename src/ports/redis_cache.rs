//! Redis Cache Adapter
//!
//! Adapter over the external Redis instance. Every call is bounded by the
//! configured (short) timeout so a hung cache never stalls a read; all
//! failures map to `CacheUnavailable`, which the cache-aside manager treats
//! as a miss.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::time::timeout;

use crate::error::{GatewayError, Result};
use crate::ports::ProductCache;

// == Redis Cache ==

pub struct RedisCache {
    conn: ConnectionManager,
    call_timeout: Duration,
}

impl RedisCache {
    /// Connects to Redis at `url`. The connection manager reconnects on its
    /// own after transient failures.
    pub async fn connect(url: &str, call_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| GatewayError::CacheUnavailable(format!("{}: {}", url, e)))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| GatewayError::CacheUnavailable(format!("{}: {}", url, e)))?;
        Ok(Self { conn, call_timeout })
    }

    async fn bounded<T>(&self, fut: impl std::future::Future<Output = redis::RedisResult<T>>) -> Result<T> {
        match timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(GatewayError::CacheUnavailable(e.to_string())),
            Err(_) => Err(GatewayError::CacheUnavailable(
                "cache call timed out".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ProductCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_string();
        self.bounded(async move { conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await })
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        self.bounded(async move { conn.del::<_, ()>(key).await })
            .await
    }
}

// == Disabled Cache ==

/// Stand-in used when Redis is unreachable at startup. Every call reports
/// `CacheUnavailable`, so the gateway serves straight from the store.
pub struct DisabledCache;

#[async_trait]
impl ProductCache for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(GatewayError::CacheUnavailable("cache disabled".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<()> {
        Err(GatewayError::CacheUnavailable("cache disabled".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(GatewayError::CacheUnavailable("cache disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_reports_unavailable() {
        let cache = DisabledCache;
        assert!(matches!(
            cache.get("product:1").await,
            Err(GatewayError::CacheUnavailable(_))
        ));
        assert!(matches!(
            cache.set("product:1", "{}", 60).await,
            Err(GatewayError::CacheUnavailable(_))
        ));
        assert!(matches!(
            cache.delete("product:1").await,
            Err(GatewayError::CacheUnavailable(_))
        ));
    }
}
