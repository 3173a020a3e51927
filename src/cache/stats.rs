//! Cache Statistics Module
//!
//! Tracks read hits/misses, writes, burns and sweeper evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live record
    pub hits: u64,
    /// Reads that found no live record
    pub misses: u64,
    /// Records persisted by `write`
    pub writes: u64,
    /// Writes dropped because the record was already expired
    pub skipped_writes: u64,
    /// Records deleted by a burn-after-reading read
    pub burned: u64,
    /// Explicit deletes
    pub deletes: u64,
    /// Records evicted by the sweeper
    pub evicted: u64,
    /// Sweeper evictions that failed
    pub eviction_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Lock-free counters shared between the facade and the sweeper.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    skipped_writes: AtomicU64,
    burned: AtomicU64,
    deletes: AtomicU64,
    evicted: AtomicU64,
    eviction_failures: AtomicU64,
}

impl Counters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_write(&self) {
        self.skipped_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_burn(&self) {
        self.burned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, evicted: u64, failed: u64) {
        self.evicted.fetch_add(evicted, Ordering::Relaxed);
        self.eviction_failures.fetch_add(failed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            skipped_writes: self.skipped_writes.load(Ordering::Relaxed),
            burned: self.burned.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            eviction_failures: self.eviction_failures.load(Ordering::Relaxed),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = Counters::default().snapshot();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = Counters::default();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_record_sweep() {
        let counters = Counters::default();
        counters.record_sweep(3, 1);
        counters.record_sweep(2, 0);

        let stats = counters.snapshot();
        assert_eq!(stats.evicted, 5);
        assert_eq!(stats.eviction_failures, 1);
    }

    #[test]
    fn test_write_counters() {
        let counters = Counters::default();
        counters.record_write();
        counters.record_write();
        counters.record_skipped_write();
        counters.record_burn();
        counters.record_delete();

        let stats = counters.snapshot();
        assert_eq!(stats.writes, 2);
        assert_eq!(stats.skipped_writes, 1);
        assert_eq!(stats.burned, 1);
        assert_eq!(stats.deletes, 1);
    }
}
