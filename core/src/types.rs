//! Shared primitive types used across the tracker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Small button step (±100k).
pub const SMALL_STEP: i64 = 100_000;

/// Large button step (±1M).
pub const LARGE_STEP: i64 = 1_000_000;

/// Maximum number of prior states kept for undo.
pub const HISTORY_DEPTH: usize = 10;

/// How long a clamp flash stays visible.
pub const FLASH_DURATION: Duration = Duration::from_millis(500);

/// Identifies one process-lifetime session in the event log.
pub type SessionId = String;

/// The two tracked quantities.
///
/// Invariant: `population <= capacity` after every committed transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityState {
    pub capacity:   u64,
    pub population: u64,
}

impl CityState {
    pub fn new(capacity: u64, population: u64) -> Self {
        Self { capacity, population }
    }

    pub fn is_valid(&self) -> bool {
        self.population <= self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Capacity,
    Population,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Capacity   => "capacity",
            Field::Population => "population",
        }
    }
}

/// Which field(s) were just clamped. Observational only, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashSignal {
    pub capacity:   bool,
    pub population: bool,
}

impl FlashSignal {
    pub const NONE: FlashSignal = FlashSignal { capacity: false, population: false };

    pub fn is_active(&self) -> bool {
        self.capacity || self.population
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Capacity   => self.capacity,
            Field::Population => self.population,
        }
    }
}

/// Outcome of applying the clamp rule to one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub previous: CityState,
    pub state:    CityState,
    pub flash:    FlashSignal,
}

impl Adjustment {
    pub fn clamped(&self) -> bool {
        self.flash.is_active()
    }
}
