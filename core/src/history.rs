//! Bounded undo stack. Oldest entry is evicted once the depth is reached.

use crate::types::{CityState, HISTORY_DEPTH};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct History {
    // Most recent entry is at the back.
    entries: VecDeque<CityState>,
}

impl History {
    pub fn new() -> Self {
        Self { entries: VecDeque::with_capacity(HISTORY_DEPTH) }
    }

    /// Record a prior state. Returns the evicted entry, if any.
    pub fn push(&mut self, state: CityState) -> Option<CityState> {
        let evicted = if self.entries.len() == HISTORY_DEPTH {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(state);
        evicted
    }

    pub fn pop(&mut self) -> Option<CityState> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&CityState> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo steps still available.
    pub fn remaining_undos(&self) -> usize {
        self.entries.len()
    }

}
