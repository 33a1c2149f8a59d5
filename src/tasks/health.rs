//! Health Check Task
//!
//! Background task that periodically probes the tracked store nodes and
//! reports the results to the failover coordinator. A failed probe of the
//! writable node is what moves the machine to primary-down when no write
//! happens to trip over it first.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ports::HealthProbe;
use crate::topology::FailoverCoordinator;

/// Spawns the periodic health-check task.
///
/// Both tracked endpoints are probed each round, including unhealthy ones,
/// so recovery is recorded too (the phase itself only moves forward through
/// the coordinator's transition rules).
///
/// # Arguments
/// * `coordinator` - owner of the topology
/// * `probe` - node liveness probe
/// * `interval_secs` - seconds between probe rounds
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_health_task(
    coordinator: Arc<FailoverCoordinator>,
    probe: Arc<dyn HealthProbe>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting health-check task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let topology = coordinator.snapshot().await;
            let mut targets = Vec::new();
            if let Some(node) = &topology.writable {
                targets.push(node.address.clone());
            }
            if let Some(node) = &topology.read_only {
                targets.push(node.address.clone());
            }

            for address in targets {
                if probe.check(&address).await {
                    debug!(address = %address, "health probe ok");
                    coordinator.report_node_healthy(&address).await;
                } else {
                    coordinator.report_node_failure(&address).await;
                }
            }
        }
    })
}
