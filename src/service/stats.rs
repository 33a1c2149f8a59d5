//! Gateway Statistics Module
//!
//! Counters for the read and write paths. Atomic so unrelated requests never
//! serialize on a stats lock; snapshots feed the status endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Gateway Stats ==

/// Running counters for the gateway.
#[derive(Debug, Default)]
pub struct GatewayStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_bypasses: AtomicU64,
    replica_reads: AtomicU64,
    fallback_reads: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
    coalesced_reads: AtomicU64,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Cache unreachable; the read fell through to the store.
    pub fn record_cache_bypass(&self) {
        self.cache_bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replica_read(&self) {
        self.replica_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Read served by the writable node because the replica was unavailable.
    pub fn record_fallback_read(&self) {
        self.fallback_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// A concurrent miss was answered by another caller's store read.
    pub fn record_coalesced_read(&self) {
        self.coalesced_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        StatsSnapshot {
            cache_hits: hits,
            cache_misses: misses,
            cache_bypasses: self.cache_bypasses.load(Ordering::Relaxed),
            cache_hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            replica_reads: self.replica_reads.load(Ordering::Relaxed),
            fallback_reads: self.fallback_reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            coalesced_reads: self.coalesced_reads.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of the counters for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_bypasses: u64,
    pub cache_hit_rate: f64,
    pub replica_reads: u64,
    pub fallback_reads: u64,
    pub writes: u64,
    pub invalidations: u64,
    pub coalesced_reads: u64,
}
