//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies. Product reads and
//! writes return the `Product` record directly; these types cover the
//! administrative and health surfaces.

use serde::Serialize;

use crate::service::StatsSnapshot;
use crate::topology::{NodeEndpoint, TopologyState};

/// One tracked endpoint, as shown on the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSummary {
    pub address: String,
    pub role: String,
    pub healthy: bool,
    pub last_health_check: String,
}

impl From<&NodeEndpoint> for EndpointSummary {
    fn from(node: &NodeEndpoint) -> Self {
        Self {
            address: node.address.clone(),
            role: format!("{:?}", node.role),
            healthy: node.healthy,
            last_health_check: node.last_health_check.to_rfc3339(),
        }
    }
}

/// Topology as seen at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct TopologySummary {
    pub phase: String,
    pub failover_in_progress: bool,
    pub writable: Option<EndpointSummary>,
    pub read_only: Option<EndpointSummary>,
    pub retired: Option<EndpointSummary>,
}

impl From<&TopologyState> for TopologySummary {
    fn from(state: &TopologyState) -> Self {
        Self {
            phase: state.phase.as_str().to_string(),
            failover_in_progress: state.failover_in_progress(),
            writable: state.writable.as_ref().map(EndpointSummary::from),
            read_only: state.read_only.as_ref().map(EndpointSummary::from),
            retired: state.retired.as_ref().map(EndpointSummary::from),
        }
    }
}

/// Response body for POST /admin/promote
#[derive(Debug, Clone, Serialize)]
pub struct PromoteResponse {
    pub message: String,
    pub topology: TopologySummary,
}

impl PromoteResponse {
    pub fn new(state: &TopologyState) -> Self {
        Self {
            message: "failover complete, writes repointed".to_string(),
            topology: TopologySummary::from(state),
        }
    }
}

/// Response body for GET /admin/status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub topology: TopologySummary,
    pub stats: StatsSnapshot,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
