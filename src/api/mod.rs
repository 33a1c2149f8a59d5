//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /products/:id` - Cache-aside read
//! - `PUT /products/:id` - Update via the writable node, then invalidate
//! - `POST /products` - Create via the writable node
//! - `POST /admin/promote` - Promote the replica after a primary failure
//! - `POST /admin/reattach` - Attach a fresh replica, return to stable
//! - `GET /admin/status` - Topology phase, endpoints, counters
//! - `GET /health` - Liveness check

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
