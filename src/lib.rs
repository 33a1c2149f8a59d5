//! Product Gateway - data-access layer with cache-aside reads and manual failover
//!
//! Routes writes to the current primary, serves reads through a Redis
//! cache-aside path backed by the replica, and keeps serving when either the
//! cache or the primary goes away.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod service;
pub mod tasks;
pub mod topology;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_health_task;
