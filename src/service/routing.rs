//! Read/Write Routing Module
//!
//! Targets store calls at whatever node the topology currently names.
//!
//! Writes only ever go to the writable node; if none is known they fail fast
//! with `NoWritablePrimary` and are never retried against the replica. Reads
//! prefer the read-only node and apply the configured fallback policy when
//! it is unavailable.

use std::sync::Arc;

use tracing::warn;

use crate::config::ReaderFallback;
use crate::error::{GatewayError, Result};
use crate::models::{Product, UpdateProductRequest};
use crate::ports::{ProductReader, ProductWriter};
use crate::service::stats::GatewayStats;
use crate::topology::FailoverCoordinator;

// == Routed Reader ==

/// Read path over the topology.
pub struct RoutedReader {
    store: Arc<dyn ProductReader>,
    coordinator: Arc<FailoverCoordinator>,
    policy: ReaderFallback,
    stats: Arc<GatewayStats>,
}

impl RoutedReader {
    pub fn new(
        store: Arc<dyn ProductReader>,
        coordinator: Arc<FailoverCoordinator>,
        policy: ReaderFallback,
        stats: Arc<GatewayStats>,
    ) -> Self {
        Self {
            store,
            coordinator,
            policy,
            stats,
        }
    }

    /// Reads a product from the replica, or per policy from the writable
    /// node. Ok(None) means the store confirmed absence.
    pub async fn read(&self, id: i64) -> Result<Option<Product>> {
        let topology = self.coordinator.snapshot().await;

        if let Some(replica) = topology.read_only_address() {
            match self.store.fetch(replica, id).await {
                Ok(row) => {
                    self.stats.record_replica_read();
                    return Ok(row);
                }
                Err(GatewayError::Unavailable(msg)) => {
                    warn!(address = replica, error = %msg, "replica read failed");
                    self.coordinator.report_node_failure(replica).await;
                }
                Err(other) => return Err(other),
            }
        }

        match self.policy {
            ReaderFallback::FailFast => Err(GatewayError::ReplicaUnavailable(
                "read-only node unavailable".to_string(),
            )),
            ReaderFallback::FallbackToWritable => self.read_from_writable(&topology, id).await,
        }
    }

    async fn read_from_writable(
        &self,
        topology: &crate::topology::TopologyState,
        id: i64,
    ) -> Result<Option<Product>> {
        let writable = topology.writable_address().ok_or_else(|| {
            GatewayError::Unavailable("no store node available for reads".to_string())
        })?;

        match self.store.fetch(writable, id).await {
            Ok(row) => {
                self.stats.record_fallback_read();
                Ok(row)
            }
            Err(GatewayError::Unavailable(msg)) => {
                warn!(address = writable, error = %msg, "fallback read failed");
                self.coordinator.report_node_failure(writable).await;
                Err(GatewayError::Unavailable(
                    "replica and writable fallback both unavailable".to_string(),
                ))
            }
            Err(other) => Err(other),
        }
    }
}

// == Routed Writer ==

/// Write path over the topology.
pub struct RoutedWriter {
    store: Arc<dyn ProductWriter>,
    coordinator: Arc<FailoverCoordinator>,
    stats: Arc<GatewayStats>,
}

impl RoutedWriter {
    pub fn new(
        store: Arc<dyn ProductWriter>,
        coordinator: Arc<FailoverCoordinator>,
        stats: Arc<GatewayStats>,
    ) -> Self {
        Self {
            store,
            coordinator,
            stats,
        }
    }

    /// Applies a partial update against the current writable node.
    /// Ok(None) if the row does not exist.
    pub async fn update(
        &self,
        id: i64,
        fields: &UpdateProductRequest,
    ) -> Result<Option<Product>> {
        let target = self.coordinator.write_target().await?;
        match self.store.update(&target, id, fields).await {
            Ok(row) => {
                self.stats.record_write();
                Ok(row)
            }
            Err(GatewayError::Unavailable(msg)) => {
                warn!(address = %target, error = %msg, "write detected unreachable primary");
                self.coordinator.report_node_failure(&target).await;
                Err(GatewayError::NoWritablePrimary)
            }
            Err(other) => Err(other),
        }
    }

    /// Inserts a new product on the current writable node.
    pub async fn insert(&self, name: &str, price_cents: i64) -> Result<Product> {
        let target = self.coordinator.write_target().await?;
        match self.store.insert(&target, name, price_cents).await {
            Ok(product) => {
                self.stats.record_write();
                Ok(product)
            }
            Err(GatewayError::Unavailable(msg)) => {
                warn!(address = %target, error = %msg, "insert detected unreachable primary");
                self.coordinator.report_node_failure(&target).await;
                Err(GatewayError::NoWritablePrimary)
            }
            Err(other) => Err(other),
        }
    }
}
