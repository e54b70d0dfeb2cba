//! Snapshot serialization: the persisted `{"capacity": n, "population": n}`.

use crate::types::CityState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default key the snapshot is stored under.
pub const DEFAULT_SNAPSHOT_KEY: &str = "city-tracker-state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub capacity:   u64,
    pub population: u64,
}

impl From<CityState> for CitySnapshot {
    fn from(state: CityState) -> Self {
        Self { capacity: state.capacity, population: state.population }
    }
}

impl From<CitySnapshot> for CityState {
    fn from(snap: CitySnapshot) -> Self {
        CityState::new(snap.capacity, snap.population)
    }
}

/// Why stored snapshot content was thrown away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotRejection {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("population {} exceeds capacity {}", .0.population, .0.capacity)]
    Inconsistent(CityState),
}

impl CitySnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse stored content. Negative numbers, missing fields and non-JSON
    /// are all malformed; a parsed state with population above capacity is
    /// rejected as inconsistent.
    pub fn parse(json: &str) -> Result<CityState, SnapshotRejection> {
        let snap: CitySnapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotRejection::Malformed(e.to_string()))?;
        let state = CityState::from(snap);
        if !state.is_valid() {
            return Err(SnapshotRejection::Inconsistent(state));
        }
        Ok(state)
    }
}
