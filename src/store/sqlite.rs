//! SQLite `KeyValueStore` backend.
//!
//! One `kv` table, rusqlite (bundled). The connection is protected by a
//! `parking_lot::ReentrantMutex<RefCell<Connection>>`, matching the
//! single-writer access pattern of the basket manager.

use std::cell::RefCell;

use parking_lot::ReentrantMutex;
use rusqlite::{params, OptionalExtension};

use crate::error::StoreError;

use super::traits::KeyValueStore;

/// File- or memory-backed SQLite key/value store.
pub struct SqliteStore {
    conn: ReentrantMutex<RefCell<rusqlite::Connection>>,
}

impl SqliteStore {
    /// Open a file-backed store, creating the schema if needed.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::from_conn(rusqlite::Connection::open(path)?)
    }

    /// Open an in-memory store (useful for tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_conn(rusqlite::Connection::open_in_memory()?)
    }

    fn from_conn(conn: rusqlite::Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;
             CREATE TABLE IF NOT EXISTS kv (
                 key   TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );",
        )?;
        Ok(Self {
            conn: ReentrantMutex::new(RefCell::new(conn)),
        })
    }

    /// Execute `f` with a shared reference to the underlying connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>,
    {
        let guard = self.conn.lock();
        let conn = guard.borrow();
        Ok(f(&conn)?)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map(|_| ())
        })
    }
}
