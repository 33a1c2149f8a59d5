//! Topology Module
//!
//! Tracks which database node currently accepts writes and which serves
//! reads, and drives the manual failover state machine.
//!
//! `TopologyState` is pure data plus transition logic, no I/O. The
//! `FailoverCoordinator` owns the single live instance and is the only
//! component allowed to mutate it; everyone else gets value snapshots.

mod coordinator;
mod node;
mod state;

pub use coordinator::FailoverCoordinator;
pub use node::{NodeEndpoint, NodeRole};
pub use state::{FailoverPhase, TopologyState};
