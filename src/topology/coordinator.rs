//! Failover Coordinator Module
//!
//! Owns the live `TopologyState` and sequences the manual promotion path:
//! instruct the replica to leave recovery, wait for confirmation, repoint
//! the external proxy, then swap the topology atomically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, Result};
use crate::ports::{ProxyControl, ReplicaPromoter};
use crate::topology::state::TopologyState;

/// Single owner of the topology. Everyone else receives value snapshots;
/// mutation goes through the methods below and nowhere else.
pub struct FailoverCoordinator {
    state: RwLock<TopologyState>,
    promoter: Arc<dyn ReplicaPromoter>,
    proxy: Arc<dyn ProxyControl>,
    confirm_attempts: u32,
    confirm_delay: Duration,
}

impl FailoverCoordinator {
    pub fn new(
        initial: TopologyState,
        promoter: Arc<dyn ReplicaPromoter>,
        proxy: Arc<dyn ProxyControl>,
        confirm_attempts: u32,
        confirm_delay: Duration,
    ) -> Self {
        Self {
            state: RwLock::new(initial),
            promoter,
            proxy,
            confirm_attempts,
            confirm_delay,
        }
    }

    /// Consistent point-in-time copy of the topology.
    pub async fn snapshot(&self) -> TopologyState {
        self.state.read().await.clone()
    }

    /// Address writes must target, or `NoWritablePrimary`.
    pub async fn write_target(&self) -> Result<String> {
        self.state
            .read()
            .await
            .writable_address()
            .map(str::to_string)
            .ok_or(GatewayError::NoWritablePrimary)
    }

    /// Records that a call against `address` failed at the transport level.
    ///
    /// Called by the ports on connection errors and by the health task on
    /// failed probes. Failure of the writable node moves the machine to
    /// primary-down; failure of the replica only marks it unhealthy.
    pub async fn report_node_failure(&self, address: &str) {
        let mut guard = self.state.write().await;
        if guard.record_node_health(address, false) {
            warn!(
                address,
                phase = guard.phase.as_str(),
                "writable node unreachable, rejecting writes until promotion"
            );
        } else {
            debug!(address, "node marked unhealthy");
        }
    }

    /// Records a successful probe of `address`.
    pub async fn report_node_healthy(&self, address: &str) {
        self.state.write().await.record_node_health(address, true);
    }

    // == Promotion ==

    /// Administrative promotion: `PrimaryDown -> Promoting -> StablePostFailover`.
    ///
    /// The external steps (promote, confirm, repoint) run without holding the
    /// topology lock. If any of them fails, the phase stays `Promoting` and
    /// is visible on the status endpoint; the call is not retried here.
    pub async fn promote(&self) -> Result<TopologyState> {
        let target = self.state.write().await.begin_promotion()?;
        info!(address = %target, "promotion accepted, instructing replica to leave recovery");

        self.promoter
            .promote(&target)
            .await
            .map_err(|e| GatewayError::Promotion(format!("promote call failed: {}", e)))?;

        let mut confirmed = false;
        for attempt in 1..=self.confirm_attempts {
            match self.promoter.confirm_writable(&target).await {
                Ok(true) => {
                    confirmed = true;
                    break;
                }
                Ok(false) => debug!(attempt, address = %target, "node still in recovery"),
                Err(e) => warn!(attempt, address = %target, error = %e, "confirmation probe failed"),
            }
            tokio::time::sleep(self.confirm_delay).await;
        }
        if !confirmed {
            return Err(GatewayError::Promotion(format!(
                "node {} never confirmed leaving recovery; topology stays in promoting",
                target
            )));
        }

        // Required coupled step: traffic only follows the new primary once
        // the proxy points at it.
        self.proxy
            .repoint(&target)
            .await
            .map_err(|e| GatewayError::Promotion(format!("proxy repoint failed: {}", e)))?;

        let mut guard = self.state.write().await;
        guard.complete_promotion()?;
        info!(
            address = %target,
            phase = guard.phase.as_str(),
            "failover complete, writes repointed"
        );
        Ok(guard.clone())
    }

    /// Attaches a fresh read-only node and returns the machine to `Stable`.
    pub async fn reattach(&self, address: &str) -> Result<TopologyState> {
        let mut guard = self.state.write().await;
        guard.reattach_replica(address)?;
        info!(address, "replica attached, topology stable");
        Ok(guard.clone())
    }
}
