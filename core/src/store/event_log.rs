//! Store methods for the per-session event log.

use crate::{error::TrackerResult, event::EventLogEntry};
use rusqlite::params;

use super::CityStore;

impl CityStore {
    pub fn append_event(&self, entry: &EventLogEntry) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, seq, event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.seq as i64,
                entry.event_type,
                entry.payload,
                entry.recorded_at,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> TrackerResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, seq, event_type, payload, recorded_at
             FROM event_log WHERE session_id = ?1
             ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id:          Some(row.get(0)?),
                    session_id:  row.get(1)?,
                    seq:         row.get::<_, i64>(2)? as u64,
                    event_type:  row.get(3)?,
                    payload:     row.get(4)?,
                    recorded_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete every event outside the `keep` most recently active sessions.
    /// Returns the number of rows removed.
    pub fn prune_sessions(&self, keep: usize) -> TrackerResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM event_log WHERE session_id NOT IN (
                 SELECT session_id FROM event_log
                 GROUP BY session_id
                 ORDER BY MAX(id) DESC
                 LIMIT ?1
             )",
            params![keep as i64],
        )?;
        Ok(removed)
    }

    /// Number of logged events of one type in a session (for tests and summaries).
    pub fn event_count(&self, session_id: &str, event_type: &str) -> TrackerResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
