//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;

/// TTL bounds for cached products, in seconds.
pub const MIN_CACHE_TTL: u64 = 30;
pub const MAX_CACHE_TTL: u64 = 120;

// == Reader Fallback Policy ==
/// What the reader port does when the read-only node is unhealthy.
///
/// Exactly one policy is active for the process lifetime; the two are never
/// mixed per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderFallback {
    /// Read from the writable node when the replica is down (availability favored)
    FallbackToWritable,
    /// Surface `ReplicaUnavailable` instead (explicit-error favored)
    FailFast,
}

impl ReaderFallback {
    /// Parses the policy from its configuration string.
    ///
    /// Unknown values fall back to `FallbackToWritable`, the default.
    pub fn parse(value: &str) -> Self {
        match value {
            "fail-fast" => ReaderFallback::FailFast,
            _ => ReaderFallback::FallbackToWritable,
        }
    }
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// DSN of the node that currently accepts writes (usually the proxy address)
    pub primary_dsn: String,
    /// DSN of the read-only replica
    pub replica_dsn: String,
    /// Redis connection URL
    pub redis_url: String,
    /// TTL in seconds for cached products, clamped to 30..=120
    pub cache_ttl_seconds: u64,
    /// Reader behavior when the replica is unhealthy
    pub reader_fallback: ReaderFallback,
    /// HTTP server port
    pub server_port: u16,
    /// Health probe interval in seconds
    pub health_check_interval: u64,
    /// Upper bound on any single store call, in milliseconds
    pub store_timeout_ms: u64,
    /// Upper bound on any single cache call, in milliseconds
    pub cache_timeout_ms: u64,
    /// How many times to poll the promoted node for recovery exit
    pub promote_confirm_attempts: u32,
    /// Delay between confirmation polls, in milliseconds
    pub promote_confirm_delay_ms: u64,
    /// Optional shell command that repoints the proxy at a new primary
    pub proxy_repoint_cmd: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PRIMARY_DSN` - writable endpoint DSN
    /// - `REPLICA_DSN` - read-only endpoint DSN
    /// - `REDIS_URL` - cache endpoint (default: redis://127.0.0.1:6379)
    /// - `CACHE_TTL_SECONDS` - product cache TTL (default: 60, clamped to 30..=120)
    /// - `READER_FALLBACK` - `fallback-to-writable` (default) or `fail-fast`
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `HEALTH_CHECK_INTERVAL` - probe frequency in seconds (default: 5)
    /// - `STORE_TIMEOUT_MS` - per-call store timeout (default: 2000)
    /// - `CACHE_TIMEOUT_MS` - per-call cache timeout (default: 300)
    /// - `PROMOTE_CONFIRM_ATTEMPTS` / `PROMOTE_CONFIRM_DELAY_MS` - promotion polling
    /// - `PROXY_REPOINT_CMD` - command run when failover repoints the proxy
    pub fn from_env() -> Self {
        Self {
            primary_dsn: env::var("PRIMARY_DSN").unwrap_or_else(|_| {
                "host=localhost port=5432 dbname=products user=products".to_string()
            }),
            replica_dsn: env::var("REPLICA_DSN").unwrap_or_else(|_| {
                "host=localhost port=5433 dbname=products user=products".to_string()
            }),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60)
                .clamp(MIN_CACHE_TTL, MAX_CACHE_TTL),
            reader_fallback: ReaderFallback::parse(
                &env::var("READER_FALLBACK").unwrap_or_default(),
            ),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            health_check_interval: env::var("HEALTH_CHECK_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            cache_timeout_ms: env::var("CACHE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            promote_confirm_attempts: env::var("PROMOTE_CONFIRM_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            promote_confirm_delay_ms: env::var("PROMOTE_CONFIRM_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            proxy_repoint_cmd: env::var("PROXY_REPOINT_CMD").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary_dsn: "host=localhost port=5432 dbname=products user=products".to_string(),
            replica_dsn: "host=localhost port=5433 dbname=products user=products".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_ttl_seconds: 60,
            reader_fallback: ReaderFallback::FallbackToWritable,
            server_port: 8000,
            health_check_interval: 5,
            store_timeout_ms: 2000,
            cache_timeout_ms: 300,
            promote_confirm_attempts: 10,
            promote_confirm_delay_ms: 500,
            proxy_repoint_cmd: None,
        }
    }
}
