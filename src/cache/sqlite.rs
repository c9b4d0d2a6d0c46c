//! SQLite Backend Module
//!
//! Durable thumbnail storage. Entries live in a single `entries` table keyed
//! by the thumbnail key; a `meta` row holds the last commit version so
//! versions stay monotonic even after expired rows are purged.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::cache::backend::{PendingWrite, ReadRecord, StoreBackend};
use crate::cache::CacheEntry;
use crate::error::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    key        TEXT PRIMARY KEY,
    value      BLOB NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER,
    version    INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_expires_at ON entries(expires_at);
CREATE TABLE IF NOT EXISTS meta (
    name  TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
INSERT OR IGNORE INTO meta (name, value) VALUES ('version', 0);
";

// == SQLite Backend ==
/// [`StoreBackend`] persisted in a SQLite database file.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!("Opened cache database at {}", path.display());
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA busy_timeout=5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl StoreBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT value, created_at, expires_at, version FROM entries WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheEntry {
                        value: row.get(0)?,
                        created_at: row.get::<_, i64>(1)? as u64,
                        expires_at: row.get::<_, Option<i64>>(2)?.map(|v| v as u64),
                        version: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn commit(&self, reads: &[ReadRecord], writes: Vec<PendingWrite>) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the database write lock up front, so validation and
        // writes see the same state even with other processes on the file.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for record in reads {
            let current: Option<i64> = tx
                .query_row(
                    "SELECT version FROM entries WHERE key = ?1",
                    params![record.key],
                    |row| row.get(0),
                )
                .optional()?;
            if current.map(|v| v as u64) != record.version {
                return Err(StoreError::Conflict {
                    key: record.key.clone(),
                });
            }
        }

        if !writes.is_empty() {
            let mut version: i64 = tx.query_row(
                "SELECT value FROM meta WHERE name = 'version'",
                [],
                |row| row.get(0),
            )?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO entries (key, value, created_at, expires_at, version)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        created_at = excluded.created_at,
                        expires_at = excluded.expires_at,
                        version = excluded.version",
                )?;
                for write in writes {
                    version += 1;
                    let entry = CacheEntry::new(write.value, write.ttl, version as u64);
                    stmt.execute(params![
                        write.key,
                        entry.value,
                        entry.created_at as i64,
                        entry.expires_at.map(|v| v as i64),
                        version,
                    ])?;
                }
            }
            tx.execute(
                "UPDATE meta SET value = ?1 WHERE name = 'version'",
                params![version],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn purge_expired(&self, now_ms: u64) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now_ms as i64],
        )?;
        Ok(removed)
    }

    fn len(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
