//! Service Module
//!
//! The gateway core: read/write routing over the topology, the cache-aside
//! protocol, and the facade the API layer calls.

mod cache_aside;
mod facade;
mod routing;
mod stats;

pub use cache_aside::{cache_key, CacheAside};
pub use facade::ProductService;
pub use routing::{RoutedReader, RoutedWriter};
pub use stats::{GatewayStats, StatsSnapshot};
