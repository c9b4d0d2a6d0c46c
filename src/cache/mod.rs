//! Cache Module
//!
//! Provides the persistent thumbnail store: transactional get/set with
//! per-entry TTL over a SQLite (or in-memory) backend.

pub mod backend;
mod entry;
pub mod sqlite;
mod stats;
mod store;
mod txn;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{MemoryBackend, StoreBackend};
pub use entry::CacheEntry;
pub use sqlite::SqliteBackend;
pub use stats::StoreStats;
pub use store::CacheStore;
pub use txn::Transaction;
