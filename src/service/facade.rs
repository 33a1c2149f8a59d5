//! Product Service Facade
//!
//! The component the API layer calls. Composes the cache-aside manager and
//! the routed writer; maps store outcomes into the gateway error taxonomy.

use std::sync::Arc;

use crate::config::ReaderFallback;
use crate::error::{GatewayError, Result};
use crate::models::{CreateProductRequest, Product, UpdateProductRequest};
use crate::ports::{ProductCache, ProductReader, ProductWriter};
use crate::service::cache_aside::CacheAside;
use crate::service::routing::{RoutedReader, RoutedWriter};
use crate::service::stats::GatewayStats;
use crate::topology::FailoverCoordinator;

pub struct ProductService {
    cache_aside: CacheAside,
    writer: RoutedWriter,
}

impl ProductService {
    /// Wires the service from its leaf ports and the topology handle.
    pub fn new(
        reader: Arc<dyn ProductReader>,
        writer: Arc<dyn ProductWriter>,
        cache: Arc<dyn ProductCache>,
        coordinator: Arc<FailoverCoordinator>,
        reader_fallback: ReaderFallback,
        cache_ttl_seconds: u64,
        stats: Arc<GatewayStats>,
    ) -> Self {
        let routed_reader =
            RoutedReader::new(reader, coordinator.clone(), reader_fallback, stats.clone());
        Self {
            cache_aside: CacheAside::new(cache, routed_reader, cache_ttl_seconds, stats.clone()),
            writer: RoutedWriter::new(writer, coordinator, stats),
        }
    }

    /// Cache-aside read of a single product.
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.cache_aside
            .get(id)
            .await?
            .ok_or(GatewayError::NotFound(id))
    }

    /// Partial update against the writable node, then synchronous cache
    /// invalidation. When no writable node is known the typed failure is
    /// returned as-is: the write never happened, so the cached value is
    /// still valid and is deliberately NOT invalidated.
    pub async fn update_product(&self, id: i64, fields: UpdateProductRequest) -> Result<Product> {
        if let Some(msg) = fields.validate() {
            return Err(GatewayError::InvalidInput(msg));
        }

        let updated = self.writer.update(id, &fields).await?;
        let product = updated.ok_or(GatewayError::NotFound(id))?;
        self.cache_aside.invalidate(id).await;
        Ok(product)
    }

    /// Insert on the writable node, then best-effort cache prime.
    pub async fn create_product(&self, fields: CreateProductRequest) -> Result<Product> {
        if let Some(msg) = fields.validate() {
            return Err(GatewayError::InvalidInput(msg));
        }

        let product = self
            .writer
            .insert(&fields.name, fields.price_cents)
            .await?;
        self.cache_aside.prime(&product).await;
        Ok(product)
    }
}
