//! Time source for the input state machines.
//!
//! Debounce, click disambiguation and interval timers never read the wall
//! clock themselves; they take an `Instant` from a `Clock` owned by the caller.

use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for deterministic tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::cell::Cell<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: std::cell::Cell::new(Instant::now()),
        }
    }

    pub fn advance_ms(&self, ms: u64) -> Instant {
        let next = self.now.get() + std::time::Duration::from_millis(ms);
        self.now.set(next);
        next
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
