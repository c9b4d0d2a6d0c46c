//! Store Backend Module
//!
//! The storage seam behind [`CacheStore`](super::CacheStore). A backend only
//! has to read single entries and apply a validated batch of writes
//! atomically; transaction bookkeeping lives in [`Transaction`](super::Transaction).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::cache::CacheEntry;
use crate::error::StoreError;

// == Commit Records ==
/// A key observed by a transaction, with the version it saw.
///
/// `version` is `None` when the key was absent. Expired entries still
/// report their version so a concurrent rewrite is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    pub key: String,
    pub version: Option<u64>,
}

/// A write buffered by a transaction until commit.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub key: String,
    pub value: Vec<u8>,
    pub ttl: Option<Duration>,
}

// == Backend Trait ==
/// Durable (or fake) key-value storage with optimistic commit.
pub trait StoreBackend: Send + Sync {
    /// Returns the stored entry for `key`, expired or not.
    fn read(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Atomically checks every read record against the current versions
    /// and, if none changed, applies all writes with fresh versions.
    ///
    /// Returns [`StoreError::Conflict`] without writing anything when a
    /// record is stale.
    fn commit(&self, reads: &[ReadRecord], writes: Vec<PendingWrite>) -> Result<(), StoreError>;

    /// Deletes entries expired at `now_ms`, returning how many were removed.
    fn purge_expired(&self, now_ms: u64) -> Result<usize, StoreError>;

    /// Number of stored entries, including expired ones not yet purged.
    fn len(&self) -> Result<usize, StoreError>;
}

// == Memory Backend ==
/// In-process backend used by tests and as a drop-in fake for the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, CacheEntry>,
    last_version: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn commit(&self, reads: &[ReadRecord], writes: Vec<PendingWrite>) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        for record in reads {
            let current = state.entries.get(&record.key).map(|e| e.version);
            if current != record.version {
                return Err(StoreError::Conflict {
                    key: record.key.clone(),
                });
            }
        }

        for write in writes {
            state.last_version += 1;
            let entry = CacheEntry::new(write.value, write.ttl, state.last_version);
            state.entries.insert(write.key, entry);
        }

        Ok(())
    }

    fn purge_expired(&self, now_ms: u64) -> Result<usize, StoreError> {
        let mut state = self.lock()?;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now_ms));
        Ok(before - state.entries.len())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.entries.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::current_timestamp_ms;

    fn write(key: &str, value: &[u8], ttl: Option<Duration>) -> PendingWrite {
        PendingWrite {
            key: key.to_string(),
            value: value.to_vec(),
            ttl,
        }
    }

    #[test]
    fn test_commit_assigns_increasing_versions() {
        let backend = MemoryBackend::new();

        backend.commit(&[], vec![write("a", b"1", None)]).unwrap();
        backend.commit(&[], vec![write("b", b"2", None)]).unwrap();

        let a = backend.read("a").unwrap().unwrap();
        let b = backend.read("b").unwrap().unwrap();
        assert!(b.version > a.version);
        assert_eq!(backend.len().unwrap(), 2);
    }

    #[test]
    fn test_commit_rejects_stale_read() {
        let backend = MemoryBackend::new();
        let stale = ReadRecord {
            key: "a".to_string(),
            version: None,
        };

        backend.commit(&[], vec![write("a", b"first", None)]).unwrap();
        let result = backend.commit(&[stale], vec![write("a", b"second", None)]);

        assert!(matches!(result, Err(StoreError::Conflict { key }) if key == "a"));
        assert_eq!(backend.read("a").unwrap().unwrap().value, b"first");
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let backend = MemoryBackend::new();
        backend
            .commit(
                &[],
                vec![
                    write("short", b"x", Some(Duration::from_millis(1))),
                    write("long", b"y", Some(Duration::from_secs(3600))),
                ],
            )
            .unwrap();

        let removed = backend.purge_expired(current_timestamp_ms() + 10).unwrap();

        assert_eq!(removed, 1);
        assert!(backend.read("short").unwrap().is_none());
        assert!(backend.read("long").unwrap().is_some());
    }
}
