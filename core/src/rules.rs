//! The adjustment rule: add a signed delta to one field, then clamp.
//!
//! Clamp order is fixed:
//!   1. negative capacity      -> 0, flag capacity
//!   2. negative population    -> 0, flag population
//!   3. population > capacity  -> population = capacity, flag capacity
//!   4. capacity shrank AND population dropped -> flag both
//!
//! The rule is total. Clamping is the only correction; nothing is rejected.

use crate::types::{Adjustment, CityState, Field, FlashSignal};

/// Apply `delta` to `field` of `current` and clamp the result.
pub fn apply_adjustment(current: CityState, field: Field, delta: i64) -> Adjustment {
    let old_capacity   = current.capacity as i128;
    let old_population = current.population as i128;

    let mut new_capacity   = old_capacity;
    let mut new_population = old_population;
    let mut flash = FlashSignal::NONE;

    match field {
        Field::Capacity   => new_capacity   += delta as i128,
        Field::Population => new_population += delta as i128,
    }

    if new_capacity < 0 {
        new_capacity = 0;
        flash.capacity = true;
    }
    if new_population < 0 {
        new_population = 0;
        flash.population = true;
    }

    if new_population > new_capacity {
        new_population = new_capacity;
        flash.capacity = true;
    }

    // A shrinking capacity dragged population down with it.
    if new_capacity < old_capacity && new_population < old_population {
        flash.capacity = true;
        flash.population = true;
    }

    let state = CityState {
        capacity:   saturate(new_capacity),
        population: saturate(new_population),
    };
    debug_assert!(state.is_valid());

    Adjustment { previous: current, state, flash }
}

/// Values are non-negative here; anything past u64::MAX saturates.
fn saturate(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
