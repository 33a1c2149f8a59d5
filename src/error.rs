//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the data-access gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Product does not exist in the store
    #[error("Product not found: {0}")]
    NotFound(i64),

    /// Request rejected before touching cache or store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cache unreachable or timed out; always absorbed by the cache-aside
    /// path, so it should never surface as an HTTP response
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Read-only node unreachable and the fail-fast policy is active
    #[error("Replica unavailable: {0}")]
    ReplicaUnavailable(String),

    /// No healthy writable node is currently known
    #[error("No writable primary available")]
    NoWritablePrimary,

    /// A store node is unreachable or a call against it timed out
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// An external promotion step (promote, confirm, repoint) failed
    #[error("Promotion failed: {0}")]
    Promotion(String),

    /// Requested topology transition is not legal from the current phase
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Product not found: {}", id))
            }
            GatewayError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::ReplicaUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            GatewayError::NoWritablePrimary => (
                StatusCode::SERVICE_UNAVAILABLE,
                "No writable primary available".to_string(),
            ),
            GatewayError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            GatewayError::Promotion(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            GatewayError::InvalidTransition(msg) => (StatusCode::CONFLICT, msg.clone()),
            GatewayError::CacheUnavailable(msg) | GatewayError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
