//! PostgreSQL Store Adapter
//!
//! Thin adapter over the external relational store. One connection pool per
//! node address, created lazily, so the same adapter serves whichever node
//! the topology currently points at. Every call is bounded by the configured
//! timeout; transport failures map to `Unavailable` so the service layer can
//! feed them into the failover machinery.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

use crate::error::{GatewayError, Result};
use crate::models::{Product, UpdateProductRequest};
use crate::ports::{HealthProbe, ProductReader, ProductWriter};

/// Connections kept per node.
const POOL_MAX_SIZE: usize = 8;

const SELECT_SQL: &str = "SELECT id, name, price_cents, updated_at FROM products WHERE id = $1";

const INSERT_SQL: &str = "INSERT INTO products (name, price_cents) VALUES ($1, $2) \
     RETURNING id, name, price_cents, updated_at";

// == Pg Store ==

/// Pooled access to the store nodes.
pub struct PgStore {
    pools: RwLock<HashMap<String, Pool>>,
    call_timeout: Duration,
}

impl PgStore {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            call_timeout,
        }
    }

    /// Returns the pool for `address`, creating it on first use.
    async fn pool_for(&self, address: &str) -> Result<Pool> {
        if let Some(pool) = self.pools.read().await.get(address) {
            return Ok(pool.clone());
        }

        let pg_config = tokio_postgres::Config::from_str(address)
            .map_err(|e| GatewayError::Internal(format!("invalid DSN '{}': {}", address, e)))?;
        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(POOL_MAX_SIZE)
            .build()
            .map_err(|e| GatewayError::Internal(format!("pool build failed: {}", e)))?;

        let mut pools = self.pools.write().await;
        Ok(pools.entry(address.to_string()).or_insert(pool).clone())
    }

    async fn with_timeout<T>(
        &self,
        address: &str,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Unavailable(format!(
                "store call to {} timed out",
                address
            ))),
        }
    }
}

/// Distinguishes server-side errors (bad SQL, constraint) from transport
/// failures (node down, connection refused).
fn map_pg_error(address: &str, error: tokio_postgres::Error) -> GatewayError {
    if error.as_db_error().is_some() {
        GatewayError::Internal(format!("query against {} failed: {}", address, error))
    } else {
        GatewayError::Unavailable(format!("{}: {}", address, error))
    }
}

fn map_pool_error(address: &str, error: deadpool_postgres::PoolError) -> GatewayError {
    GatewayError::Unavailable(format!("{}: {}", address, error))
}

fn row_to_product(row: &Row) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        price_cents: row.get("price_cents"),
        updated_at: row.get("updated_at"),
    }
}

/// Builds the dynamic UPDATE statement. `updated_at = now()` is always part
/// of the SET list; the store owns that column.
fn update_sql(has_name: bool, has_price: bool) -> String {
    let mut sets: Vec<String> = Vec::new();
    let mut idx = 0;
    if has_name {
        idx += 1;
        sets.push(format!("name = ${}", idx));
    }
    if has_price {
        idx += 1;
        sets.push(format!("price_cents = ${}", idx));
    }
    sets.push("updated_at = now()".to_string());
    format!(
        "UPDATE products SET {} WHERE id = ${} RETURNING id, name, price_cents, updated_at",
        sets.join(", "),
        idx + 1
    )
}

#[async_trait]
impl ProductReader for PgStore {
    async fn fetch(&self, address: &str, id: i64) -> Result<Option<Product>> {
        let pool = self.pool_for(address).await?;
        self.with_timeout(address, async {
            let client = pool.get().await.map_err(|e| map_pool_error(address, e))?;
            let row = client
                .query_opt(SELECT_SQL, &[&id])
                .await
                .map_err(|e| map_pg_error(address, e))?;
            Ok(row.as_ref().map(row_to_product))
        })
        .await
    }
}

#[async_trait]
impl ProductWriter for PgStore {
    async fn update(
        &self,
        address: &str,
        id: i64,
        fields: &UpdateProductRequest,
    ) -> Result<Option<Product>> {
        let sql = update_sql(fields.name.is_some(), fields.price_cents.is_some());
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(name) = &fields.name {
            params.push(name);
        }
        if let Some(price) = &fields.price_cents {
            params.push(price);
        }
        params.push(&id);

        let pool = self.pool_for(address).await?;
        self.with_timeout(address, async {
            let client = pool.get().await.map_err(|e| map_pool_error(address, e))?;
            let row = client
                .query_opt(sql.as_str(), &params)
                .await
                .map_err(|e| map_pg_error(address, e))?;
            Ok(row.as_ref().map(row_to_product))
        })
        .await
    }

    async fn insert(&self, address: &str, name: &str, price_cents: i64) -> Result<Product> {
        let pool = self.pool_for(address).await?;
        self.with_timeout(address, async {
            let client = pool.get().await.map_err(|e| map_pool_error(address, e))?;
            let row = client
                .query_one(INSERT_SQL, &[&name, &price_cents])
                .await
                .map_err(|e| map_pg_error(address, e))?;
            Ok(row_to_product(&row))
        })
        .await
    }
}

// == Direct Connections ==

/// Single unpooled connection, used by probes and promotion where a pool per
/// address would outlive its usefulness. Dropping it tears down the driver.
pub(crate) struct NodeConn {
    pub client: tokio_postgres::Client,
    driver: tokio::task::JoinHandle<()>,
}

impl Drop for NodeConn {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

pub(crate) async fn connect_node(address: &str) -> Result<NodeConn> {
    let config = tokio_postgres::Config::from_str(address)
        .map_err(|e| GatewayError::Internal(format!("invalid DSN '{}': {}", address, e)))?;
    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| GatewayError::Unavailable(format!("{}: {}", address, e)))?;
    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::debug!(error = %e, "node connection closed");
        }
    });
    Ok(NodeConn { client, driver })
}

// == Health Probe ==

/// Probe that considers a node healthy if it answers `SELECT 1` in time.
pub struct PgHealthProbe {
    probe_timeout: Duration,
}

impl PgHealthProbe {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn check(&self, address: &str) -> bool {
        let probe = async {
            let conn = connect_node(address).await?;
            conn.client
                .simple_query("SELECT 1")
                .await
                .map_err(|e| GatewayError::Unavailable(format!("{}: {}", address, e)))?;
            Ok::<_, GatewayError>(())
        };
        matches!(timeout(self.probe_timeout, probe).await, Ok(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_sql_both_fields() {
        let sql = update_sql(true, true);
        assert_eq!(
            sql,
            "UPDATE products SET name = $1, price_cents = $2, updated_at = now() \
             WHERE id = $3 RETURNING id, name, price_cents, updated_at"
        );
    }

    #[test]
    fn test_update_sql_price_only() {
        let sql = update_sql(false, true);
        assert_eq!(
            sql,
            "UPDATE products SET price_cents = $1, updated_at = now() \
             WHERE id = $2 RETURNING id, name, price_cents, updated_at"
        );
    }

    #[test]
    fn test_update_sql_name_only() {
        let sql = update_sql(true, false);
        assert!(sql.starts_with("UPDATE products SET name = $1, updated_at = now()"));
        assert!(sql.contains("WHERE id = $2"));
    }

    #[tokio::test]
    async fn test_fetch_against_unreachable_node_is_unavailable() {
        // Port 1 refuses connections immediately.
        let store = PgStore::new(Duration::from_millis(500));
        let result = store
            .fetch("host=127.0.0.1 port=1 dbname=x user=x connect_timeout=1", 1)
            .await;
        assert!(matches!(result, Err(GatewayError::Unavailable(_))));
    }
}
