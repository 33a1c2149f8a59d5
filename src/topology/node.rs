//! Node Endpoint Module
//!
//! Defines a single tracked database endpoint and its role.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Node Role ==
/// Role a tracked endpoint currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeRole {
    /// Accepts mutations
    Writable,
    /// Serves reads only
    ReadOnly,
    /// Former primary retired by a completed failover
    Unreachable,
}

// == Node Endpoint ==
/// A database endpoint tracked by the topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeEndpoint {
    /// Connection address (DSN)
    pub address: String,
    /// Current role
    pub role: NodeRole,
    /// Result of the most recent health probe
    pub healthy: bool,
    /// When the endpoint was last probed (or created)
    pub last_health_check: DateTime<Utc>,
}

impl NodeEndpoint {
    /// Creates a writable endpoint, assumed healthy until probed.
    pub fn writable(address: impl Into<String>) -> Self {
        Self::new(address, NodeRole::Writable)
    }

    /// Creates a read-only endpoint, assumed healthy until probed.
    pub fn read_only(address: impl Into<String>) -> Self {
        Self::new(address, NodeRole::ReadOnly)
    }

    fn new(address: impl Into<String>, role: NodeRole) -> Self {
        Self {
            address: address.into(),
            role,
            healthy: true,
            last_health_check: Utc::now(),
        }
    }

    /// Records a health probe result.
    pub fn record_health(&mut self, healthy: bool) {
        self.healthy = healthy;
        self.last_health_check = Utc::now();
    }

    /// True if this endpoint can currently be targeted for its role.
    pub fn usable(&self) -> bool {
        self.healthy && self.role != NodeRole::Unreachable
    }
}
