//! Store methods for the named snapshot entry.

use crate::error::TrackerResult;
use rusqlite::{params, OptionalExtension};

use super::CityStore;

impl CityStore {
    /// Write (or overwrite) the raw snapshot JSON under `key`.
    pub fn put_snapshot(&self, key: &str, state_json: &str) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (key, state_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 state_json = excluded.state_json,
                 updated_at = excluded.updated_at",
            params![key, state_json, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Raw snapshot JSON under `key`, unparsed.
    pub fn get_snapshot(&self, key: &str) -> TrackerResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }
}
