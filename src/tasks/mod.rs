//! Background Tasks Module
//!
//! Contains background tasks that run periodically during gateway operation.
//!
//! # Tasks
//! - Health checks: probes the tracked store nodes and feeds the results to
//!   the failover coordinator

mod health;

pub use health::spawn_health_task;
