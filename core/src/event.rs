//! Events emitted by the engine. Every one is appended to the event log.

use crate::types::{CityState, Field, FlashSignal, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CityEvent {
    // ── Lifecycle ──────────────────────────────────
    SessionStarted {
        session_id: SessionId,
        snapshot_key: String,
    },
    SnapshotRestored {
        state: CityState,
    },
    SnapshotDiscarded {
        reason: String,
    },

    // ── Mutations ──────────────────────────────────
    StateAdjusted {
        field: Field,
        delta: i64,
        before: CityState,
        after: CityState,
    },
    ValueClamped {
        flash: FlashSignal,
        requested: i64,
        field: Field,
    },
    UndoApplied {
        restored: CityState,
        remaining: usize,
    },
    UndoSkipped,
    ResetApplied {
        before: CityState,
    },
    ResetDeclined,
}

impl CityEvent {
    /// Stable name for the event_type column.
    pub fn kind(&self) -> &'static str {
        match self {
            CityEvent::SessionStarted { .. }    => "session_started",
            CityEvent::SnapshotRestored { .. }  => "snapshot_restored",
            CityEvent::SnapshotDiscarded { .. } => "snapshot_discarded",
            CityEvent::StateAdjusted { .. }     => "state_adjusted",
            CityEvent::ValueClamped { .. }      => "value_clamped",
            CityEvent::UndoApplied { .. }       => "undo_applied",
            CityEvent::UndoSkipped              => "undo_skipped",
            CityEvent::ResetApplied { .. }      => "reset_applied",
            CityEvent::ResetDeclined            => "reset_declined",
        }
    }
}

/// Row shape of the event_log table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:          Option<i64>,
    pub session_id:  SessionId,
    pub seq:         u64,
    pub event_type:  String,
    pub payload:     String,
    pub recorded_at: String,
}

impl EventLogEntry {
    pub fn decode(&self) -> serde_json::Result<CityEvent> {
        serde_json::from_str(&self.payload)
    }
}
