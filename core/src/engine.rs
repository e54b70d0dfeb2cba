//! The tracker engine: the single owner of state, history and flash.
//!
//! RULES:
//!   - Every committed change (adjust, reset, effective undo) is persisted
//!     before it becomes the in-memory state.
//!   - Every operation records its events in the session's event log.
//!     The log is an audit trail: a failed log write is warned about and
//!     never undoes or fails a change that already committed.
//!   - Undo restores a prior committed state as-is; the clamp rule is not
//!     re-run and no flash is emitted.

use crate::{
    command::CityCommand,
    config::TrackerConfig,
    error::{TrackerError, TrackerResult},
    event::{CityEvent, EventLogEntry},
    flash::FlashTimer,
    history::History,
    rules::apply_adjustment,
    snapshot::CitySnapshot,
    store::CityStore,
    types::{Adjustment, CityState, Field, FlashSignal, SessionId},
};
use std::time::Instant;

/// The confirmation step in front of a reset.
pub trait ResetGate {
    /// Return true to let the reset proceed.
    fn confirm_reset(&mut self, current: &CityState) -> bool;
}

impl<F> ResetGate for F
where
    F: FnMut(&CityState) -> bool,
{
    fn confirm_reset(&mut self, current: &CityState) -> bool {
        self(current)
    }
}

/// A pre-answered confirmation.
impl ResetGate for bool {
    fn confirm_reset(&mut self, _current: &CityState) -> bool {
        *self
    }
}

pub struct CityEngine {
    pub session_id: SessionId,
    config:  TrackerConfig,
    state:   CityState,
    history: History,
    flash:   FlashTimer,
    store:   CityStore,
    seq:     u64,
}

impl CityEngine {
    /// Wire an engine onto an open store and restore the saved snapshot.
    pub fn open(store: CityStore, config: TrackerConfig) -> TrackerResult<Self> {
        if config.snapshot_key.trim().is_empty() {
            return Err(TrackerError::Config {
                field: "snapshot_key",
                reason: "must not be empty".into(),
            });
        }
        store.migrate()?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let mut engine = Self {
            session_id,
            config,
            state: CityState::default(),
            history: History::new(),
            flash: FlashTimer::new(),
            store,
            seq: 0,
        };

        engine.record(CityEvent::SessionStarted {
            session_id: engine.session_id.clone(),
            snapshot_key: engine.config.snapshot_key.clone(),
        });
        match engine.store.prune_sessions(engine.config.event_log_sessions.max(1)) {
            Ok(0) => {}
            Ok(n) => log::debug!("pruned {n} event log rows from old sessions"),
            Err(e) => log::warn!("could not prune event log: {e}"),
        }
        engine.load_snapshot();

        log::info!(
            "session {} started at capacity={} population={}",
            engine.session_id,
            engine.state.capacity,
            engine.state.population
        );
        Ok(engine)
    }

    /// Open the database named in `config` and build an engine on it.
    pub fn build(config: TrackerConfig) -> TrackerResult<Self> {
        let store = if config.db_path == ":memory:" {
            CityStore::in_memory()?
        } else {
            CityStore::open(&config.db_path)?
        };
        Self::open(store, config)
    }

    // ── Read side ──────────────────────────────────────────────

    pub fn state(&self) -> CityState {
        self.state
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.remaining_undos()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &CityStore {
        &self.store
    }

    /// Flash as visible at `now`.
    pub fn flash(&self, now: Instant) -> FlashSignal {
        self.flash.current(now)
    }

    /// Run the pending flash clear if due. Returns true if the flash changed.
    pub fn poll_flash(&mut self, now: Instant) -> bool {
        self.flash.poll(now)
    }

    /// Decoded events of this session, in order.
    pub fn events(&self) -> TrackerResult<Vec<CityEvent>> {
        self.store
            .events_for_session(&self.session_id)?
            .iter()
            .map(|e| e.decode().map_err(TrackerError::from))
            .collect()
    }

    // ── Operations ─────────────────────────────────────────────

    pub fn adjust(&mut self, field: Field, delta: i64) -> TrackerResult<Adjustment> {
        self.adjust_at(field, delta, Instant::now())
    }

    /// Adjust with an explicit clock reading for the flash schedule.
    pub fn adjust_at(&mut self, field: Field, delta: i64, now: Instant) -> TrackerResult<Adjustment> {
        let adj = apply_adjustment(self.state, field, delta);
        self.commit(adj.state)?;

        self.record(CityEvent::StateAdjusted {
            field,
            delta,
            before: adj.previous,
            after: adj.state,
        });

        if adj.clamped() {
            log::debug!(
                "clamped {} {:+}: capacity_flash={} population_flash={}",
                field.as_str(),
                delta,
                adj.flash.capacity,
                adj.flash.population
            );
            self.flash.trigger(adj.flash, now);
            self.record(CityEvent::ValueClamped {
                flash: adj.flash,
                requested: delta,
                field,
            });
        }

        Ok(adj)
    }

    /// Restore the most recent prior state. Returns None when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> TrackerResult<Option<CityState>> {
        let Some(&restored) = self.history.peek() else {
            self.record(CityEvent::UndoSkipped);
            return Ok(None);
        };

        self.write_snapshot(restored)?;
        self.history.pop();
        self.state = restored;

        self.record(CityEvent::UndoApplied {
            restored,
            remaining: self.history.len(),
        });
        Ok(Some(restored))
    }

    /// Reset to `{0, 0}` if `gate` confirms. The reset is itself undoable.
    /// Returns whether it went through.
    pub fn reset<G>(&mut self, gate: &mut G) -> TrackerResult<bool>
    where
        G: ResetGate + ?Sized,
    {
        if !gate.confirm_reset(&self.state) {
            self.record(CityEvent::ResetDeclined);
            return Ok(false);
        }

        let before = self.state;
        self.commit(CityState::default())?;
        // A zeroed city has nothing left to flag.
        self.flash.cancel();
        self.record(CityEvent::ResetApplied { before });
        log::info!("reset from capacity={} population={}", before.capacity, before.population);
        Ok(true)
    }

    /// Dispatch a serialized command.
    pub fn apply(&mut self, command: CityCommand) -> TrackerResult<CityState> {
        log::trace!("apply {}", command.name());
        match command {
            CityCommand::Adjust { field, delta } => {
                self.adjust(field, delta)?;
            }
            CityCommand::Undo => {
                self.undo()?;
            }
            CityCommand::Reset { confirmed } => {
                let mut gate = confirmed;
                self.reset(&mut gate)?;
            }
        }
        Ok(self.state)
    }

    // ── Persistence ────────────────────────────────────────────

    /// Persist the current state under the configured key.
    pub fn save_snapshot(&self) -> TrackerResult<()> {
        self.write_snapshot(self.state)
    }

    /// Replace the current state with the saved snapshot, or the default when
    /// there is none or it cannot be used. Never fails.
    pub fn load_snapshot(&mut self) -> CityState {
        let key = self.config.snapshot_key.clone();
        let raw = match self.store.get_snapshot(&key) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("could not read snapshot '{key}': {e}; starting from default");
                None
            }
        };

        let event = match raw.as_deref().map(CitySnapshot::parse) {
            None => {
                self.state = CityState::default();
                None
            }
            Some(Ok(state)) => {
                log::info!("restored snapshot '{key}'");
                self.state = state;
                Some(CityEvent::SnapshotRestored { state })
            }
            Some(Err(rejection)) => {
                log::warn!("discarding snapshot '{key}': {rejection}");
                self.state = CityState::default();
                Some(CityEvent::SnapshotDiscarded { reason: rejection.to_string() })
            }
        };

        if let Some(event) = event {
            self.record(event);
        }
        self.state
    }

    /// Persist the final state and end the session.
    pub fn close(self) -> TrackerResult<()> {
        self.save_snapshot()?;
        log::info!("session {} closed", self.session_id);
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    /// Persist `next`, then make it current with the old state on history.
    fn commit(&mut self, next: CityState) -> TrackerResult<()> {
        self.write_snapshot(next)?;
        self.history.push(self.state);
        self.state = next;
        Ok(())
    }

    fn write_snapshot(&self, state: CityState) -> TrackerResult<()> {
        let json = CitySnapshot::from(state).to_json()?;
        self.store.put_snapshot(&self.config.snapshot_key, &json)
    }

    fn record(&mut self, event: CityEvent) {
        if let Err(e) = self.try_record(&event) {
            log::warn!("could not log {} event: {e}", event.kind());
        }
    }

    fn try_record(&mut self, event: &CityEvent) -> TrackerResult<()> {
        self.seq += 1;
        let entry = EventLogEntry {
            id:          None,
            session_id:  self.session_id.clone(),
            seq:         self.seq,
            event_type:  event.kind().to_string(),
            payload:     serde_json::to_string(event)?,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store.append_event(&entry)
    }
}
