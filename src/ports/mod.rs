//! Ports Module
//!
//! Capability interfaces over the external collaborators (relational store,
//! cache, proxy, replication controls) plus their production adapters. The
//! service layer only ever sees the traits; tests plug in mock
//! implementations with failure injection.

mod postgres;
mod promotion;
mod redis_cache;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Product, UpdateProductRequest};

pub use postgres::{PgHealthProbe, PgStore};
pub use promotion::{CommandProxyControl, LogOnlyProxyControl, PgPromoter};
pub use redis_cache::{DisabledCache, RedisCache};

// == Store Ports ==

/// Executes queries against a specific store node. Address selection is the
/// service layer's job; adapters just run the statement where told.
#[async_trait]
pub trait ProductReader: Send + Sync {
    /// Fetches a product by id from the node at `address`.
    /// Ok(None) means the store confirmed absence.
    async fn fetch(&self, address: &str, id: i64) -> Result<Option<Product>>;
}

/// Executes mutations against a specific store node.
#[async_trait]
pub trait ProductWriter: Send + Sync {
    /// Applies a partial update; Ok(None) if the row does not exist.
    async fn update(
        &self,
        address: &str,
        id: i64,
        fields: &UpdateProductRequest,
    ) -> Result<Option<Product>>;

    /// Inserts a new product, returning the stored row.
    async fn insert(&self, address: &str, name: &str, price_cents: i64) -> Result<Product>;
}

// == Cache Port ==

/// The external cache. Failures are reported as `CacheUnavailable`, never
/// fatal; the cache-aside manager absorbs them.
#[async_trait]
pub trait ProductCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

// == Failover Collaborators ==

/// Instructs a read-only node to become writable and observes the result.
#[async_trait]
pub trait ReplicaPromoter: Send + Sync {
    /// Tells the node at `address` to leave recovery mode.
    async fn promote(&self, address: &str) -> Result<()>;

    /// True once the node reports it is no longer in recovery.
    async fn confirm_writable(&self, address: &str) -> Result<bool>;
}

/// Repoints the external reverse proxy at a new primary. The gateway knows
/// nothing about the proxy's configuration format.
#[async_trait]
pub trait ProxyControl: Send + Sync {
    async fn repoint(&self, address: &str) -> Result<()>;
}

// == Health Probe ==

/// Liveness probe for a store node, used by the background health task.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// True if the node at `address` answers within the configured timeout.
    async fn check(&self, address: &str) -> bool;
}
