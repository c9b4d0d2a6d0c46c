//! Thumbnail Service for serving cached thumbnails.
//!
//! `get_or_create` runs one store transaction per call:
//!
//! ```text
//!   txn.get(key) ──hit──▶ return stored bytes (no write, no TTL refresh)
//!        │
//!       miss
//!        ▼
//!   read source ─▶ decode + orient ─▶ resize 800px ─▶ encode
//!        ▼
//!   txn.set_with_ttl(key, bytes, 7d) ─▶ commit ─▶ return bytes
//! ```
//!
//! The commit is validated against the version observed by `txn.get`, so
//! two transactions that both saw a miss cannot both persist an entry:
//! duplicate compute is possible, duplicate durable state is not. That
//! validated commit is the only correctness guarantee.
//!
//! Keys are normalized before use, so `sub//x.jpg`, `sub/./x.jpg` and
//! `sub/x.jpg` share one entry.
//!
//! The per-key lock below only affects scheduling inside one process:
//! requests for a key already being rendered wait and then read the
//! committed entry instead of rendering it again. It does not order
//! anything across processes, and removing it would not change what the
//! store ends up holding.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error};

use crate::cache::CacheStore;
use crate::error::ThumbnailError;

use super::pipeline::Thumbnailer;

/// Lifetime of a stored thumbnail.
pub const THUMBNAIL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// =============================================================================
// Thumbnail
// =============================================================================

/// Result of a thumbnail lookup.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Encoded JPEG bytes
    pub data: Vec<u8>,

    /// Whether the bytes came from the store
    pub cache_hit: bool,
}

// =============================================================================
// Thumbnail Service
// =============================================================================

/// Get-or-create front end over the thumbnail store.
pub struct ThumbnailService {
    /// Injected store handle
    store: CacheStore,

    /// Directory that keys are resolved against
    source_dir: PathBuf,

    thumbnailer: Thumbnailer,

    ttl: Duration,

    /// Per-key locks for requests currently in progress
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// Shared lock for one key plus the number of leases holding it.
#[derive(Default)]
struct InFlight {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

impl ThumbnailService {
    /// Create a service serving images from `source_dir` with a 7 day TTL.
    pub fn new(store: CacheStore, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            source_dir: source_dir.into(),
            thumbnailer: Thumbnailer::new(),
            ttl: THUMBNAIL_TTL,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Override the TTL attached to newly written thumbnails.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the thumbnail for `key`, generating and storing it on a miss.
    ///
    /// `key` is the image's path relative to the source directory.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if `key` is empty, absolute or contains `..`
    ///
    /// Equivalent spellings of a key (`a//b.jpg`, `a/./b.jpg`) are
    /// normalized to `a/b.jpg` before the store is consulted.
    /// - `SourceNotFound` if the source file cannot be read
    /// - `DecodeFailed` / `EncodeFailed` for codec failures
    /// - `CacheUnavailable` if the store fails or the commit conflicts
    ///
    /// Nothing is written to the store unless the whole call succeeds.
    pub async fn get_or_create(&self, key: &str) -> Result<Thumbnail, ThumbnailError> {
        let result = self.get_or_create_inner(key).await;
        if let Err(ref e) = result {
            error!(key = %key, error = %e, "Failed to serve thumbnail");
        }
        result
    }

    async fn get_or_create_inner(&self, key: &str) -> Result<Thumbnail, ThumbnailError> {
        let SourceKey { key: normalized, path } = resolve_source(&self.source_dir, key)?;
        if normalized != key {
            debug!(key = %key, normalized = %normalized, "Normalized thumbnail key");
        }

        let lease = self.lease(&normalized);
        let _guard = lease.lock.lock().await;

        let store = self.store.clone();
        let thumbnailer = self.thumbnailer.clone();
        let ttl = self.ttl;

        // Dropping this future (client gone) leaves the blocking work to
        // finish on its own; its result is simply discarded.
        tokio::task::spawn_blocking(move || {
            load_or_render(&store, &thumbnailer, &normalized, &path, ttl)
        })
        .await
        .map_err(|e| ThumbnailError::Internal(e.to_string()))?
    }

    fn lease(&self, key: &str) -> KeyLease<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = in_flight.entry(key.to_string()).or_default();
        entry.holders += 1;
        KeyLease {
            service: self,
            key: key.to_string(),
            lock: Arc::clone(&entry.lock),
        }
    }
}

/// Holds a per-key lock handle; removes the map entry when the last holder leaves.
///
/// The holder count only changes under the map mutex, so concurrent drops
/// cannot both miss the last one.
struct KeyLease<'a> {
    service: &'a ThumbnailService,
    key: String,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for KeyLease<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .service
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = in_flight.get_mut(&self.key) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}

/// The get-or-create transaction itself. Blocking.
fn load_or_render(
    store: &CacheStore,
    thumbnailer: &Thumbnailer,
    key: &str,
    source_path: &Path,
    ttl: Duration,
) -> Result<Thumbnail, ThumbnailError> {
    store.update(|txn| {
        if let Some(data) = txn.get(key)? {
            debug!(key = %key, "Loading thumbnail from cache");
            return Ok(Thumbnail {
                data,
                cache_hit: true,
            });
        }

        debug!(key = %key, "Generating thumbnail");
        let source = std::fs::read(source_path).map_err(|source| {
            ThumbnailError::SourceNotFound {
                path: source_path.to_path_buf(),
                source,
            }
        })?;
        let data = thumbnailer.render(&source)?;

        txn.set_with_ttl(key, data.clone(), ttl);
        Ok(Thumbnail {
            data,
            cache_hit: false,
        })
    })
}

/// A validated thumbnail key and the source file it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    /// Normalized key: the path's plain components joined with `/`
    pub key: String,
    /// Source file inside the served directory
    pub path: PathBuf,
}

/// Map a key onto a path inside `source_dir`.
///
/// Only relative paths are accepted; anything that could leave the
/// directory is rejected before the store or filesystem is touched.
/// Repeated separators and `.` segments are dropped, so every spelling of
/// one file yields the same normalized key.
pub fn resolve_source(source_dir: &Path, key: &str) -> Result<SourceKey, ThumbnailError> {
    let invalid = || ThumbnailError::InvalidKey {
        key: key.to_string(),
    };

    let mut parts = Vec::new();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }

    let path = parts
        .iter()
        .fold(source_dir.to_path_buf(), |path, part| path.join(part));
    Ok(SourceKey {
        key: parts.join("/"),
        path,
    })
}

// =============================================================================
// Tests
// =============================================================================
