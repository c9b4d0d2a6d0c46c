//! Cache Store Module
//!
//! The process-wide handle to thumbnail storage. All mutation goes through
//! [`CacheStore::update`], which runs a closure as one atomic transaction.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::cache::backend::{MemoryBackend, StoreBackend};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::sqlite::SqliteBackend;
use crate::cache::stats::{StatsRecorder, StoreStats};
use crate::cache::Transaction;
use crate::error::StoreError;

// == Cache Store ==
/// Shared, cheaply cloneable handle to a [`StoreBackend`].
#[derive(Clone)]
pub struct CacheStore {
    /// Storage implementation
    backend: Arc<dyn StoreBackend>,
    /// Activity counters shared by all clones
    stats: Arc<StatsRecorder>,
}

impl CacheStore {
    // == Constructors ==
    /// Wraps an arbitrary backend.
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            stats: Arc::new(StatsRecorder::default()),
        }
    }

    /// Opens the durable SQLite store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(SqliteBackend::open(path)?))
    }

    /// Creates a store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    // == Update ==
    /// Runs `f` as a single transaction.
    ///
    /// If `f` returns `Err`, every write it buffered is discarded. If it
    /// returns `Ok`, the writes are committed atomically, provided no key
    /// that `f` read has been rewritten since; otherwise the commit fails
    /// with [`StoreError::Conflict`] and nothing is written. Transactions
    /// are never retried here.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut txn = Transaction::new(self.backend.as_ref(), &self.stats);
        let value = f(&mut txn)?;

        let (reads, writes) = txn.into_parts();
        if writes.is_empty() {
            return Ok(value);
        }

        let count = writes.len();
        match self.backend.commit(&reads, writes) {
            Ok(()) => {
                self.stats.record_writes(count);
                Ok(value)
            }
            Err(err) => {
                if let StoreError::Conflict { key } = &err {
                    self.stats.record_conflict();
                    warn!(key = %key, "Cache transaction conflict");
                }
                Err(err.into())
            }
        }
    }

    // == Cleanup Expired ==
    /// Reclaims every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> Result<usize, StoreError> {
        let removed = self.backend.purge_expired(current_timestamp_ms())?;
        self.stats.record_reclaimed(removed);
        Ok(removed)
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> Result<usize, StoreError> {
        self.backend.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(self.stats.snapshot(self.len()?))
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
