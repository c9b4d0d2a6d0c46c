//! TTL Cleanup Task
//!
//! Background task that periodically reclaims expired thumbnails. Expired
//! entries are already invisible to reads; this only frees their space.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Spawns a background task that periodically reclaims expired thumbnails.
///
/// The task sleeps for `cleanup_interval_secs` between runs and performs
/// each purge on the blocking pool, since the store is synchronous.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(store: CacheStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let store = store.clone();
            let removed = tokio::task::spawn_blocking(move || store.cleanup_expired()).await;

            match removed {
                Ok(Ok(0)) => debug!("TTL cleanup: no expired thumbnails found"),
                Ok(Ok(count)) => info!("TTL cleanup: reclaimed {} expired thumbnails", count),
                Ok(Err(e)) => warn!(error = %e, "TTL cleanup failed"),
                Err(e) => warn!(error = %e, "TTL cleanup worker panicked"),
            }
        }
    })
}
