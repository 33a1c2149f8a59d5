//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::models::{
    CreateProductRequest, HealthResponse, Product, PromoteResponse, ReattachRequest,
    StatusResponse, TopologySummary, UpdateProductRequest,
};
use crate::service::{GatewayStats, ProductService};
use crate::topology::FailoverCoordinator;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read/write facade over cache and store
    pub service: Arc<ProductService>,
    /// Owner of the topology; the only mutation path for failover
    pub coordinator: Arc<FailoverCoordinator>,
    /// Gateway counters for the status endpoint
    pub stats: Arc<GatewayStats>,
}

impl AppState {
    pub fn new(
        service: Arc<ProductService>,
        coordinator: Arc<FailoverCoordinator>,
        stats: Arc<GatewayStats>,
    ) -> Self {
        Self {
            service,
            coordinator,
            stats,
        }
    }
}

/// Handler for GET /products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    let product = state.service.get_product(id).await?;
    Ok(Json(product))
}

/// Handler for PUT /products/:id
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let product = state.service.update_product(id, req).await?;
    Ok(Json(product))
}

/// Handler for POST /products
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.service.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for POST /admin/promote
///
/// Triggers the manual `PrimaryDown -> Promoting -> StablePostFailover`
/// path. 409 if the machine is not in primary-down; 502 if an external
/// promotion step fails (the phase then stays promoting and shows up on the
/// status endpoint).
pub async fn promote_handler(State(state): State<AppState>) -> Result<Json<PromoteResponse>> {
    let topology = state.coordinator.promote().await?;
    Ok(Json(PromoteResponse::new(&topology)))
}

/// Handler for POST /admin/reattach
pub async fn reattach_handler(
    State(state): State<AppState>,
    Json(req): Json<ReattachRequest>,
) -> Result<Json<TopologySummary>> {
    let topology = state.coordinator.reattach(&req.address).await?;
    Ok(Json(TopologySummary::from(&topology)))
}

/// Handler for GET /admin/status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let topology = state.coordinator.snapshot().await;
    Json(StatusResponse {
        topology: TopologySummary::from(&topology),
        stats: state.stats.snapshot(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
