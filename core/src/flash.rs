//! Clamp flash scheduling.
//!
//! A flash is shown for FLASH_DURATION after a clamp. Each new trigger
//! cancels whatever clear was pending and schedules its own, so the most
//! recent clamp always decides when the flash ends.
//!
//! Time is passed in by the caller; nothing here reads the wall clock.

use crate::types::{FlashSignal, FLASH_DURATION};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct FlashTimer {
    signal:   FlashSignal,
    clear_at: Option<Instant>,
}

impl Default for FlashTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashTimer {
    pub fn new() -> Self {
        Self { signal: FlashSignal::NONE, clear_at: None }
    }

    /// Show `signal` and (re)schedule its clear. Inactive signals are ignored
    /// so a clean adjustment never cuts a running flash short.
    pub fn trigger(&mut self, signal: FlashSignal, now: Instant) {
        if !signal.is_active() {
            return;
        }
        self.signal = signal;
        self.clear_at = Some(now + FLASH_DURATION);
    }

    /// Fire the pending clear if it is due. Returns true if the signal changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.signal = FlashSignal::NONE;
                self.clear_at = None;
                true
            }
            _ => false,
        }
    }

    /// The signal as it would look at `now`, without mutating.
    pub fn current(&self, now: Instant) -> FlashSignal {
        match self.clear_at {
            Some(deadline) if now < deadline => self.signal,
            _ => FlashSignal::NONE,
        }
    }

    /// Drop the flash immediately and cancel its clear.
    pub fn cancel(&mut self) {
        self.signal = FlashSignal::NONE;
        self.clear_at = None;
    }
}
