//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine calls store methods; it never executes SQL directly.

mod event_log;
mod snapshot;

use crate::error::TrackerResult;
use rusqlite::Connection;

pub struct CityStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl CityStore {
    /// Open (or create) the tracker database at `path`.
    pub fn open(path: &str) -> TrackerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn, path: Some(path.to_string()) })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> TrackerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same file. For in-memory databases
    /// this yields a fresh, empty database.
    pub fn reopen(&self) -> TrackerResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Idempotent.
    pub fn migrate(&self) -> TrackerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}
