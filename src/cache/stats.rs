//! Cache Statistics Module
//!
//! Tracks store activity: transactional reads, committed writes, commit
//! conflicts and TTL reclamation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Store Stats ==
/// Point-in-time snapshot of store metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Transactional reads that found a live entry
    pub hits: u64,
    /// Transactional reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries written by committed transactions
    pub writes: u64,
    /// Commits rejected because a key they read had changed
    pub conflicts: u64,
    /// Expired entries reclaimed by cleanup
    pub reclaimed: u64,
    /// Current number of entries held by the backend
    pub total_entries: usize,
}

impl StoreStats {
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

// == Stats Recorder ==
/// Lock-free counters shared by every clone of a store handle.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    conflicts: AtomicU64,
    reclaimed: AtomicU64,
}

impl StatsRecorder {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_writes(&self, count: usize) {
        self.writes.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reclaimed(&self, count: usize) {
        self.reclaimed.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, total_entries: usize) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            total_entries,
        }
    }
}
