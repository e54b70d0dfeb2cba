//! Snapshot load/save and the event log.

use city_tracker_core::{
    command::CityCommand,
    config::TrackerConfig,
    engine::CityEngine,
    event::CityEvent,
    store::CityStore,
    types::{CityState, Field, LARGE_STEP, SMALL_STEP},
};

/// Shared-cache in-memory database so a second connection sees the first
/// one's writes, standing in for a restart against the same file.
fn shared_store(name: &str) -> CityStore {
    let store = CityStore::open(&format!("file:{name}?mode=memory&cache=shared"))
        .expect("shared in-memory store");
    store.migrate().expect("migration");
    store
}

/// A second raw connection onto a shared-cache database, for breaking
/// parts of the schema underneath the engine.
fn raw_connection(name: &str) -> rusqlite::Connection {
    rusqlite::Connection::open_with_flags(
        format!("file:{name}?mode=memory&cache=shared"),
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
            | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
            | rusqlite::OpenFlags::SQLITE_OPEN_URI,
    )
    .expect("raw connection")
}

fn config() -> TrackerConfig {
    TrackerConfig::default_test()
}

#[test]
fn snapshot_round_trips_into_a_fresh_engine() {
    let first = shared_store("round_trip");
    let mut engine = CityEngine::open(first.reopen().expect("reopen"), config()).expect("open");
    engine.adjust(Field::Capacity, LARGE_STEP).expect("capacity");
    engine.adjust(Field::Population, 300_000).expect("population");
    let saved = engine.state();
    engine.save_snapshot().expect("save");

    let restarted = CityEngine::open(first.reopen().expect("reopen"), config()).expect("reopen engine");
    assert_eq!(restarted.state(), saved);
    assert!(!restarted.can_undo(), "history does not survive a restart");
    assert_ne!(restarted.session_id, engine.session_id);
}

#[test]
fn every_mutation_is_persisted_immediately() {
    let keep = shared_store("persist_each");
    let mut engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");

    let stored = |store: &CityStore| -> CityState {
        let json = store.get_snapshot("test-state").expect("read").expect("snapshot present");
        serde_json::from_str(&json).expect("valid snapshot json")
    };

    engine.adjust(Field::Capacity, SMALL_STEP).expect("adjust");
    assert_eq!(stored(&keep), CityState::new(100_000, 0));

    engine.adjust(Field::Capacity, SMALL_STEP).expect("adjust");
    engine.undo().expect("undo");
    assert_eq!(stored(&keep), CityState::new(100_000, 0), "undo must be persisted");

    engine.reset(&mut |_: &CityState| true).expect("reset");
    assert_eq!(stored(&keep), CityState::default());
}

#[test]
fn missing_snapshot_starts_from_default() {
    let engine = CityEngine::open(CityStore::in_memory().expect("store"), config()).expect("open");
    assert_eq!(engine.state(), CityState::default());
}

#[test]
fn malformed_snapshot_is_discarded_silently() {
    let keep = shared_store("malformed");
    keep.put_snapshot("test-state", "{not json").expect("write garbage");

    let engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open must not fail");
    assert_eq!(engine.state(), CityState::default());

    let events = engine.events().expect("events");
    assert!(
        events.iter().any(|e| matches!(e, CityEvent::SnapshotDiscarded { .. })),
        "expected a discard event, got {events:?}"
    );
}

#[test]
fn inconsistent_snapshot_is_discarded() {
    let keep = shared_store("inconsistent");
    keep.put_snapshot("test-state", r#"{"capacity":5,"population":9}"#)
        .expect("write");

    let engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    assert_eq!(engine.state(), CityState::default());
}

#[test]
fn snapshot_keys_are_isolated() {
    let keep = shared_store("keys");
    keep.put_snapshot("other-city", r#"{"capacity":5,"population":1}"#)
        .expect("write");

    let engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    assert_eq!(engine.state(), CityState::default());

    let other = TrackerConfig { snapshot_key: "other-city".into(), ..config() };
    let engine = CityEngine::open(keep.reopen().expect("reopen"), other).expect("open");
    assert_eq!(engine.state(), CityState::new(5, 1));
}

#[test]
fn empty_snapshot_key_is_rejected() {
    let bad = TrackerConfig { snapshot_key: "  ".into(), ..config() };
    assert!(CityEngine::open(CityStore::in_memory().expect("store"), bad).is_err());
}

#[test]
fn event_log_records_the_session_in_order() {
    let mut engine = CityEngine::open(CityStore::in_memory().expect("store"), config()).expect("open");
    engine.apply(CityCommand::Adjust { field: Field::Population, delta: SMALL_STEP }).expect("clamped adjust");
    engine.apply(CityCommand::Undo).expect("undo");
    engine.apply(CityCommand::Undo).expect("empty undo");
    engine.apply(CityCommand::Reset { confirmed: false }).expect("declined reset");

    let kinds: Vec<&str> = engine.events().expect("events").iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "session_started",
            "state_adjusted",
            "value_clamped",
            "undo_applied",
            "undo_skipped",
            "reset_declined",
        ]
    );
    assert_eq!(
        engine.store().event_count(&engine.session_id, "value_clamped").expect("count"),
        1
    );
}

#[test]
fn close_persists_final_state() {
    let keep = shared_store("close");
    let mut engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    engine.adjust(Field::Capacity, LARGE_STEP).expect("adjust");
    engine.close().expect("close");

    let engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    assert_eq!(engine.state(), CityState::new(1_000_000, 0));
}

#[test]
fn no_op_undo_and_declined_reset_leave_the_snapshot_untouched() {
    let keep = shared_store("untouched");
    // Field order differs from what the engine writes, so any rewrite shows.
    let seeded = r#"{"population":1,"capacity":5}"#;
    keep.put_snapshot("test-state", seeded).expect("seed snapshot");

    let mut engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    assert_eq!(engine.state(), CityState::new(5, 1));

    assert_eq!(engine.undo().expect("empty undo"), None);
    assert!(!engine.reset(&mut |_: &CityState| false).expect("declined reset"));

    let stored = keep.get_snapshot("test-state").expect("read").expect("present");
    assert_eq!(stored, seeded, "snapshot must not be rewritten by no-op operations");
}

#[test]
fn unreadable_snapshot_table_falls_back_to_default() {
    let keep = CityStore::open("file:unreadable?mode=memory&cache=shared").expect("store");
    // A view squatting on the table name makes every snapshot read fail.
    raw_connection("unreadable")
        .execute_batch("CREATE VIEW snapshot AS SELECT 1 AS unrelated;")
        .expect("create view");

    let engine = CityEngine::open(keep.reopen().expect("reopen"), config())
        .expect("open must survive a failing snapshot read");
    assert_eq!(engine.state(), CityState::default());
}

#[test]
fn saturated_values_round_trip() {
    let keep = shared_store("saturated");
    let mut engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    for _ in 0..3 {
        engine.adjust(Field::Capacity, i64::MAX).expect("grow capacity");
    }
    for _ in 0..3 {
        engine.adjust(Field::Population, i64::MAX).expect("grow population");
    }
    assert_eq!(engine.state(), CityState::new(u64::MAX, u64::MAX));

    let restarted = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("reopen engine");
    assert_eq!(restarted.state(), CityState::new(u64::MAX, u64::MAX));
}

#[test]
fn event_log_failure_does_not_fail_a_committed_change() {
    let keep = shared_store("log_offline");
    let mut engine = CityEngine::open(keep.reopen().expect("reopen"), config()).expect("open");
    raw_connection("log_offline")
        .execute_batch(
            "CREATE TRIGGER log_offline BEFORE INSERT ON event_log
             BEGIN SELECT RAISE(ABORT, 'event log offline'); END;",
        )
        .expect("create trigger");

    let t0 = std::time::Instant::now();
    let adj = engine
        .adjust_at(Field::Population, SMALL_STEP, t0)
        .expect("adjust commits despite the log");
    assert!(adj.clamped());
    assert!(engine.flash(t0).is_active(), "flash must still fire");
    assert_eq!(engine.history_len(), 1);

    engine.adjust(Field::Capacity, LARGE_STEP).expect("adjust");
    engine.undo().expect("undo commits despite the log");
    assert!(engine.reset(&mut true).expect("reset commits despite the log"));

    let stored = keep.get_snapshot("test-state").expect("read").expect("present");
    assert_eq!(stored, r#"{"capacity":0,"population":0}"#);

    let kinds: Vec<&str> = engine.events().expect("events").iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["session_started"]);
}

#[test]
fn old_sessions_are_pruned_from_the_event_log() {
    let keep = shared_store("prune");
    let short = TrackerConfig { event_log_sessions: 2, ..config() };

    let first = CityEngine::open(keep.reopen().expect("reopen"), short.clone()).expect("open first");
    let second = CityEngine::open(keep.reopen().expect("reopen"), short.clone()).expect("open second");
    assert!(!keep.events_for_session(&first.session_id).expect("events").is_empty());

    let third = CityEngine::open(keep.reopen().expect("reopen"), short).expect("open third");
    assert!(keep.events_for_session(&first.session_id).expect("events").is_empty());
    assert!(!keep.events_for_session(&second.session_id).expect("events").is_empty());
    assert!(!third.events().expect("events").is_empty());
}
