//! Topology State Module
//!
//! Pure data and transition logic for the failover state machine. No I/O
//! happens here; the coordinator sequences the external steps and applies
//! the resulting transitions.
//!
//! Invariant: at most one endpoint holds the `Writable` role. During the
//! failover window there may be none, and writes must fail fast rather than
//! target a stale address.

use serde::Serialize;

use crate::error::{GatewayError, Result};
use crate::topology::node::{NodeEndpoint, NodeRole};

// == Failover Phase ==
/// Phase of the failover state machine.
///
/// Replication alone never leaves `PrimaryDown`; only the explicit
/// administrative promotion path does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailoverPhase {
    /// Writable node healthy, accepting writes
    Stable,
    /// Writable node failed a health check; writes rejected
    PrimaryDown,
    /// Administrative promotion accepted but not yet confirmed
    Promoting,
    /// Former read-only node is now writable; old primary retired
    StablePostFailover,
}

impl FailoverPhase {
    /// Stable phase name for logs and the status endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailoverPhase::Stable => "stable",
            FailoverPhase::PrimaryDown => "primary-down",
            FailoverPhase::Promoting => "promoting",
            FailoverPhase::StablePostFailover => "stable-post-failover",
        }
    }
}

// == Topology State ==
/// Addresses and roles of the tracked database nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyState {
    /// Node currently accepting writes, if any
    pub writable: Option<NodeEndpoint>,
    /// Node currently serving reads, if any
    pub read_only: Option<NodeEndpoint>,
    /// Old primary retired by a completed failover
    pub retired: Option<NodeEndpoint>,
    /// Current phase of the failover state machine
    pub phase: FailoverPhase,
}

impl TopologyState {
    /// Creates the initial topology from the configured endpoints.
    pub fn new(primary_address: impl Into<String>, replica_address: impl Into<String>) -> Self {
        Self {
            writable: Some(NodeEndpoint::writable(primary_address)),
            read_only: Some(NodeEndpoint::read_only(replica_address)),
            retired: None,
            phase: FailoverPhase::Stable,
        }
    }

    // == Targeting ==

    /// Address of the node writes may target right now, if any.
    ///
    /// None while the primary is down or a promotion is in flight.
    pub fn writable_address(&self) -> Option<&str> {
        match self.phase {
            FailoverPhase::Stable | FailoverPhase::StablePostFailover => self
                .writable
                .as_ref()
                .filter(|node| node.usable())
                .map(|node| node.address.as_str()),
            FailoverPhase::PrimaryDown | FailoverPhase::Promoting => None,
        }
    }

    /// Address of the healthy read-only node, if any.
    pub fn read_only_address(&self) -> Option<&str> {
        self.read_only
            .as_ref()
            .filter(|node| node.usable())
            .map(|node| node.address.as_str())
    }

    /// True while an accepted promotion has not yet been confirmed.
    pub fn failover_in_progress(&self) -> bool {
        self.phase == FailoverPhase::Promoting
    }

    // == Health ==

    /// Applies a health probe result for the node at `address`.
    ///
    /// A failed probe against the writable node moves the machine to
    /// `PrimaryDown`. A later successful probe does NOT move it back:
    /// returning to `Stable` requires the explicit reattach path.
    ///
    /// Returns true if the phase changed.
    pub fn record_node_health(&mut self, address: &str, healthy: bool) -> bool {
        if let Some(node) = self.read_only.as_mut().filter(|n| n.address == address) {
            node.record_health(healthy);
            return false;
        }

        if let Some(node) = self.writable.as_mut().filter(|n| n.address == address) {
            node.record_health(healthy);
            if !healthy
                && matches!(
                    self.phase,
                    FailoverPhase::Stable | FailoverPhase::StablePostFailover
                )
            {
                self.phase = FailoverPhase::PrimaryDown;
                return true;
            }
        }
        false
    }

    // == Transitions ==

    /// `PrimaryDown -> Promoting`. Returns the address of the node being
    /// promoted; the external promote/confirm/repoint steps run against it.
    pub fn begin_promotion(&mut self) -> Result<String> {
        if self.phase != FailoverPhase::PrimaryDown {
            return Err(GatewayError::InvalidTransition(format!(
                "promotion requires primary-down, current phase is {}",
                self.phase.as_str()
            )));
        }
        let candidate = self
            .read_only
            .as_ref()
            .filter(|node| node.usable())
            .map(|node| node.address.clone())
            .ok_or_else(|| {
                GatewayError::InvalidTransition("no healthy read-only node to promote".to_string())
            })?;

        self.phase = FailoverPhase::Promoting;
        Ok(candidate)
    }

    /// `Promoting -> StablePostFailover`. Applied as a single swap so no
    /// concurrent snapshot observes a half-updated writable/read-only pair.
    pub fn complete_promotion(&mut self) -> Result<()> {
        if self.phase != FailoverPhase::Promoting {
            return Err(GatewayError::InvalidTransition(format!(
                "completion requires promoting, current phase is {}",
                self.phase.as_str()
            )));
        }
        let mut promoted = self.read_only.take().ok_or_else(|| {
            GatewayError::InvalidTransition("promoted node disappeared mid-failover".to_string())
        })?;
        promoted.role = NodeRole::Writable;
        promoted.record_health(true);

        if let Some(mut old) = self.writable.take() {
            old.role = NodeRole::Unreachable;
            old.healthy = false;
            self.retired = Some(old);
        }

        self.writable = Some(promoted);
        self.phase = FailoverPhase::StablePostFailover;
        Ok(())
    }

    /// `any -> Stable` by attaching a fresh read-only node. Requires a
    /// healthy writable node; this is the only way back to `Stable`.
    pub fn reattach_replica(&mut self, address: impl Into<String>) -> Result<()> {
        let writable_ok = self.writable.as_ref().is_some_and(|node| node.usable());
        if !writable_ok {
            return Err(GatewayError::InvalidTransition(
                "cannot reattach a replica without a healthy writable node".to_string(),
            ));
        }
        self.read_only = Some(NodeEndpoint::read_only(address));
        self.retired = None;
        self.phase = FailoverPhase::Stable;
        Ok(())
    }

    /// Number of endpoints currently holding the `Writable` role.
    #[cfg(test)]
    pub fn writable_role_count(&self) -> usize {
        [&self.writable, &self.read_only, &self.retired]
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|node| node.role == NodeRole::Writable)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> TopologyState {
        TopologyState::new("host=primary", "host=replica")
    }

    #[test]
    fn test_initial_state_is_stable() {
        let state = fresh();
        assert_eq!(state.phase, FailoverPhase::Stable);
        assert_eq!(state.writable_address(), Some("host=primary"));
        assert_eq!(state.read_only_address(), Some("host=replica"));
        assert_eq!(state.writable_role_count(), 1);
    }

    #[test]
    fn test_primary_failure_rejects_writes_keeps_reads() {
        let mut state = fresh();
        assert!(state.record_node_health("host=primary", false));
        assert_eq!(state.phase, FailoverPhase::PrimaryDown);
        assert_eq!(state.writable_address(), None);
        assert_eq!(state.read_only_address(), Some("host=replica"));
    }

    #[test]
    fn test_primary_recovery_does_not_leave_primary_down() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);
        // Replication catching up or the node answering again is not enough.
        assert!(!state.record_node_health("host=primary", true));
        assert_eq!(state.phase, FailoverPhase::PrimaryDown);
        assert_eq!(state.writable_address(), None);
    }

    #[test]
    fn test_replica_failure_does_not_change_phase() {
        let mut state = fresh();
        assert!(!state.record_node_health("host=replica", false));
        assert_eq!(state.phase, FailoverPhase::Stable);
        assert_eq!(state.read_only_address(), None);
        assert_eq!(state.writable_address(), Some("host=primary"));
    }

    #[test]
    fn test_promotion_requires_primary_down() {
        let mut state = fresh();
        assert!(state.begin_promotion().is_err());
        assert_eq!(state.phase, FailoverPhase::Stable);
    }

    #[test]
    fn test_promotion_requires_healthy_replica() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);
        state.record_node_health("host=replica", false);
        assert!(state.begin_promotion().is_err());
        assert_eq!(state.phase, FailoverPhase::PrimaryDown);
    }

    #[test]
    fn test_full_failover_sequence() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);

        let target = state.begin_promotion().unwrap();
        assert_eq!(target, "host=replica");
        assert_eq!(state.phase, FailoverPhase::Promoting);
        // No writable target while the promotion is in flight.
        assert_eq!(state.writable_address(), None);
        assert!(state.failover_in_progress());

        state.complete_promotion().unwrap();
        assert_eq!(state.phase, FailoverPhase::StablePostFailover);
        assert_eq!(state.writable_address(), Some("host=replica"));
        assert_eq!(state.read_only_address(), None);
        assert_eq!(state.retired.as_ref().unwrap().role, NodeRole::Unreachable);
        assert_eq!(state.writable_role_count(), 1);
    }

    #[test]
    fn test_complete_promotion_requires_promoting() {
        let mut state = fresh();
        assert!(state.complete_promotion().is_err());
    }

    #[test]
    fn test_reattach_returns_to_stable() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);
        state.begin_promotion().unwrap();
        state.complete_promotion().unwrap();

        state.reattach_replica("host=replica2").unwrap();
        assert_eq!(state.phase, FailoverPhase::Stable);
        assert_eq!(state.writable_address(), Some("host=replica"));
        assert_eq!(state.read_only_address(), Some("host=replica2"));
        assert_eq!(state.writable_role_count(), 1);
    }

    #[test]
    fn test_reattach_requires_healthy_writable() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);
        assert!(state.reattach_replica("host=replica2").is_err());
        assert_eq!(state.phase, FailoverPhase::PrimaryDown);
    }

    #[test]
    fn test_post_failover_primary_can_go_down_again() {
        let mut state = fresh();
        state.record_node_health("host=primary", false);
        state.begin_promotion().unwrap();
        state.complete_promotion().unwrap();

        assert!(state.record_node_health("host=replica", false));
        assert_eq!(state.phase, FailoverPhase::PrimaryDown);
        assert_eq!(state.writable_address(), None);
    }
}
