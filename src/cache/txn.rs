//! Transaction Module
//!
//! A transaction reads through to the backend, remembering the version of
//! every key it observed, and buffers writes until
//! [`CacheStore::update`](super::CacheStore::update) commits them.

use std::time::Duration;

use tracing::trace;

use crate::cache::backend::{PendingWrite, ReadRecord, StoreBackend};
use crate::cache::stats::StatsRecorder;
use crate::error::StoreError;

// == Transaction ==
/// Read/write access to the store for the duration of one `update` call.
pub struct Transaction<'a> {
    backend: &'a dyn StoreBackend,
    stats: &'a StatsRecorder,
    reads: Vec<ReadRecord>,
    writes: Vec<PendingWrite>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(backend: &'a dyn StoreBackend, stats: &'a StatsRecorder) -> Self {
        Self {
            backend,
            stats,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    ///
    /// Expired entries read as `None`. Writes buffered earlier in this
    /// transaction are visible to later reads.
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(pending) = self.writes.iter().rev().find(|w| w.key == key) {
            return Ok(Some(pending.value.clone()));
        }

        let entry = self.backend.read(key)?;
        self.observe(key, entry.as_ref().map(|e| e.version));

        match entry {
            Some(entry) if !entry.is_expired() => {
                trace!(key = %key, ttl_remaining_ms = ?entry.ttl_remaining_ms(), "Store hit");
                self.stats.record_hit();
                Ok(Some(entry.value))
            }
            _ => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Set With TTL ==
    /// Buffers `value` under `key`, expiring `ttl` after commit.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: Vec<u8>, ttl: Duration) {
        self.writes.push(PendingWrite {
            key: key.into(),
            value,
            ttl: Some(ttl),
        });
    }

    /// Only the first observation of a key is kept; a later read seeing a
    /// different version must fail validation.
    fn observe(&mut self, key: &str, version: Option<u64>) {
        if !self.reads.iter().any(|r| r.key == key) {
            self.reads.push(ReadRecord {
                key: key.to_string(),
                version,
            });
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<ReadRecord>, Vec<PendingWrite>) {
        (self.reads, self.writes)
    }
}
