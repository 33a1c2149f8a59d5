//! Shared test fixtures: mock store nodes with controllable replication and
//! failure injection, a mock cache, and a fully wired gateway app.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::util::ServiceExt;

use product_gateway::api::{create_router, AppState};
use product_gateway::config::ReaderFallback;
use product_gateway::error::{GatewayError, Result};
use product_gateway::models::{Product, UpdateProductRequest};
use product_gateway::ports::{
    HealthProbe, ProductCache, ProductReader, ProductWriter, ProxyControl, ReplicaPromoter,
};
use product_gateway::service::{GatewayStats, ProductService};
use product_gateway::topology::{FailoverCoordinator, TopologyState};

pub const PRIMARY: &str = "host=primary";
pub const REPLICA: &str = "host=replica";

// == Mock Store ==

/// Two store nodes with independent row sets. Replication between them is
/// explicit (`replicate`), so tests control the staleness window.
pub struct MockStore {
    nodes: Mutex<HashMap<String, HashMap<i64, Product>>>,
    down: Mutex<HashSet<String>>,
    reads: Mutex<HashMap<String, u64>>,
    next_id: AtomicI64,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        let mut nodes = HashMap::new();
        nodes.insert(PRIMARY.to_string(), HashMap::new());
        nodes.insert(REPLICA.to_string(), HashMap::new());
        Arc::new(Self {
            nodes: Mutex::new(nodes),
            down: Mutex::new(HashSet::new()),
            reads: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1000),
        })
    }

    /// Seeds a product on every node, as if replication had caught up.
    pub fn seed(&self, product: Product) {
        let mut nodes = self.nodes.lock().unwrap();
        for rows in nodes.values_mut() {
            rows.insert(product.id, product.clone());
        }
    }

    pub fn take_down(&self, address: &str) {
        self.down.lock().unwrap().insert(address.to_string());
    }

    pub fn bring_up(&self, address: &str) {
        self.down.lock().unwrap().remove(address);
    }

    /// One-shot replication: copies all rows from one node onto another.
    pub fn replicate(&self, from: &str, to: &str) {
        let mut nodes = self.nodes.lock().unwrap();
        let source = nodes.get(from).cloned().unwrap_or_default();
        nodes.insert(to.to_string(), source);
    }

    pub fn reads_on(&self, address: &str) -> u64 {
        *self.reads.lock().unwrap().get(address).unwrap_or(&0)
    }

    pub fn total_reads(&self) -> u64 {
        self.reads.lock().unwrap().values().sum()
    }

    pub fn row_on(&self, address: &str, id: i64) -> Option<Product> {
        self.nodes
            .lock()
            .unwrap()
            .get(address)
            .and_then(|rows| rows.get(&id).cloned())
    }

    fn check(&self, address: &str) -> Result<()> {
        if self.down.lock().unwrap().contains(address) {
            return Err(GatewayError::Unavailable(format!(
                "{}: connection refused",
                address
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductReader for MockStore {
    async fn fetch(&self, address: &str, id: i64) -> Result<Option<Product>> {
        self.check(address)?;
        *self
            .reads
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_insert(0) += 1;
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .get(address)
            .and_then(|rows| rows.get(&id).cloned()))
    }
}

#[async_trait]
impl ProductWriter for MockStore {
    async fn update(
        &self,
        address: &str,
        id: i64,
        fields: &UpdateProductRequest,
    ) -> Result<Option<Product>> {
        self.check(address)?;
        let mut nodes = self.nodes.lock().unwrap();
        let rows = nodes.entry(address.to_string()).or_default();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &fields.name {
            row.name = name.clone();
        }
        if let Some(price) = fields.price_cents {
            row.price_cents = price;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn insert(&self, address: &str, name: &str, price_cents: i64) -> Result<Product> {
        self.check(address)?;
        let product = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            price_cents,
            updated_at: Utc::now(),
        };
        self.nodes
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .insert(product.id, product.clone());
        Ok(product)
    }
}

// == Mock Cache ==

pub struct MockCache {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MockCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        })
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Simulates every TTL elapsing at once.
    pub fn expire_all(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::CacheUnavailable(
                "injected cache failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCache for MockCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_seconds: u64) -> Result<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// == Failover Collaborator Mocks ==

pub struct MockPromoter {
    pub confirm: AtomicBool,
}

#[async_trait]
impl ReplicaPromoter for MockPromoter {
    async fn promote(&self, _address: &str) -> Result<()> {
        Ok(())
    }

    async fn confirm_writable(&self, _address: &str) -> Result<bool> {
        Ok(self.confirm.load(Ordering::SeqCst))
    }
}

pub struct MockProxy {
    pub repointed_to: Mutex<Option<String>>,
}

#[async_trait]
impl ProxyControl for MockProxy {
    async fn repoint(&self, address: &str) -> Result<()> {
        *self.repointed_to.lock().unwrap() = Some(address.to_string());
        Ok(())
    }
}

pub struct MockProbe;

#[async_trait]
impl HealthProbe for MockProbe {
    async fn check(&self, _address: &str) -> bool {
        true
    }
}

// == Gateway Fixture ==

pub struct TestGateway {
    pub app: Router,
    pub store: Arc<MockStore>,
    pub cache: Arc<MockCache>,
    pub coordinator: Arc<FailoverCoordinator>,
    pub stats: Arc<GatewayStats>,
    pub proxy: Arc<MockProxy>,
    pub promoter: Arc<MockPromoter>,
}

pub fn gateway(policy: ReaderFallback) -> TestGateway {
    let store = MockStore::new();
    let cache = MockCache::new();
    let stats = Arc::new(GatewayStats::new());
    let promoter = Arc::new(MockPromoter {
        confirm: AtomicBool::new(true),
    });
    let proxy = Arc::new(MockProxy {
        repointed_to: Mutex::new(None),
    });
    let coordinator = Arc::new(FailoverCoordinator::new(
        TopologyState::new(PRIMARY, REPLICA),
        promoter.clone(),
        proxy.clone(),
        3,
        Duration::from_millis(1),
    ));
    let service = Arc::new(ProductService::new(
        store.clone(),
        store.clone(),
        cache.clone(),
        coordinator.clone(),
        policy,
        60,
        stats.clone(),
    ));
    let app = create_router(AppState::new(service, coordinator.clone(), stats.clone()));

    TestGateway {
        app,
        store,
        cache,
        coordinator,
        stats,
        proxy,
        promoter,
    }
}

pub fn sample_product(id: i64, price_cents: i64) -> Product {
    Product {
        id,
        name: format!("product-{}", id),
        price_cents,
        updated_at: Utc::now(),
    }
}

// == Request Helpers ==

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
