//! Cache-Aside Module
//!
//! Read-through cache protocol over the cache port and the routed reader:
//! lookup, miss-fill with TTL, explicit invalidation after writes.
//!
//! Cache failures are absorbed here and treated as misses; they never fail a
//! read. Concurrent misses for the same id are coalesced through a per-key
//! slot so only one store read is in flight per key; the slot is a RAII
//! guard, so timeout or caller cancellation releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::Product;
use crate::ports::ProductCache;
use crate::service::routing::RoutedReader;
use crate::service::stats::GatewayStats;

/// Cache key for a product id. Format is fixed: `product:{id}`.
pub fn cache_key(id: i64) -> String {
    format!("product:{}", id)
}

// == Cache-Aside Manager ==

pub struct CacheAside {
    cache: Arc<dyn ProductCache>,
    reader: RoutedReader,
    ttl_seconds: u64,
    stats: Arc<GatewayStats>,
    /// Per-key single-flight slots; entries are dropped once idle.
    flights: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl CacheAside {
    pub fn new(
        cache: Arc<dyn ProductCache>,
        reader: RoutedReader,
        ttl_seconds: u64,
        stats: Arc<GatewayStats>,
    ) -> Self {
        Self {
            cache,
            reader,
            ttl_seconds,
            stats,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Cache-aside read. Ok(None) means the store confirmed absence;
    /// negative results are not cached.
    pub async fn get(&self, id: i64) -> Result<Option<Product>> {
        let key = cache_key(id);

        if let Some(product) = self.lookup(&key, true).await {
            return Ok(Some(product));
        }

        // Miss (or cache bypass): coalesce concurrent readers of this id.
        let slot = {
            let mut flights = self.flights.lock().expect("flight map poisoned");
            flights
                .entry(id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let guard = slot.lock().await;

        // Another flight may have populated the entry while we waited.
        if let Some(product) = self.lookup(&key, false).await {
            self.stats.record_coalesced_read();
            drop(guard);
            self.release(id, &slot);
            return Ok(Some(product));
        }

        let result = self.reader.read(id).await;
        if let Ok(Some(product)) = &result {
            self.populate(&key, product).await;
        }

        drop(guard);
        self.release(id, &slot);
        result
    }

    /// Deletes the cached entry for `id` after a successful write. Failures
    /// are logged and swallowed; the entry still expires via TTL.
    pub async fn invalidate(&self, id: i64) {
        let key = cache_key(id);
        self.stats.record_invalidation();
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key, error = %e, "cache invalidation failed, entry expires via TTL");
        }
    }

    /// Best-effort pre-population after a create.
    pub async fn prime(&self, product: &Product) {
        let key = cache_key(product.id);
        self.populate(&key, product).await;
    }

    /// Cache lookup; any failure counts as a bypass and reads fall through
    /// to the store. The re-check after waiting on a flight slot passes
    /// `record = false` so one request counts one lookup.
    async fn lookup(&self, key: &str, record: bool) -> Option<Product> {
        match self.cache.get(key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(product) => {
                    if record {
                        self.stats.record_cache_hit();
                    }
                    Some(product)
                }
                Err(e) => {
                    warn!(key, error = %e, "discarding malformed cache entry");
                    if record {
                        self.stats.record_cache_miss();
                    }
                    None
                }
            },
            Ok(None) => {
                if record {
                    self.stats.record_cache_miss();
                }
                None
            }
            Err(e) => {
                debug!(key, error = %e, "cache unavailable, bypassing");
                if record {
                    self.stats.record_cache_bypass();
                }
                None
            }
        }
    }

    /// Best-effort population; a failed set only skips the cache.
    async fn populate(&self, key: &str, product: &Product) {
        match serde_json::to_string(product) {
            Ok(json) => {
                if let Err(e) = self.cache.set(key, &json, self.ttl_seconds).await {
                    warn!(key, error = %e, "cache population skipped");
                }
            }
            Err(e) => warn!(key, error = %e, "product not serializable for cache"),
        }
    }

    /// Drops the flight slot once no other reader holds it.
    fn release(&self, id: i64, slot: &Arc<tokio::sync::Mutex<()>>) {
        let mut flights = self.flights.lock().expect("flight map poisoned");
        // One clone in the map, one in our hand.
        if Arc::strong_count(slot) <= 2 {
            flights.remove(&id);
        }
    }
}
