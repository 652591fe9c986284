//! # View Scope Module
//!
//! Every activated view owns exactly one `ViewScope`. The scope records the
//! interval timers and input listeners the view registered, and `dispose`
//! cancels all of them at once.
//!
//! ## Invariants
//! - `dispose` is idempotent; a disposed scope has no timers and no listeners.
//! - Dropping a scope disposes it.
//! - The navigator disposes the outgoing scope before it activates the next
//!   view, so at most one set of per-view timers is alive at any time.

use std::time::{Duration, Instant};

/// Period of every per-view interval timer (60 Hz)
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Applies a pending time cursor value to the map
    CursorApply,
    /// Refreshes the hover info card
    HoverRefresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    MapClick,
    TrendClick,
    ZoomOutButton,
    RelativeToggle,
}

#[derive(Debug, Clone)]
struct IntervalTimer {
    kind: TimerKind,
    period: Duration,
    next_due: Instant,
}

#[derive(Debug)]
pub struct ViewScope {
    label: String,
    timers: Vec<IntervalTimer>,
    listeners: Vec<Listener>,
    disposed: bool,
}

impl ViewScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            timers: Vec::new(),
            listeners: Vec::new(),
            disposed: false,
        }
    }

    /// Register an interval timer whose first tick is one period from `now`.
    pub fn every(&mut self, kind: TimerKind, period: Duration, now: Instant) {
        if self.disposed {
            return;
        }
        self.timers.push(IntervalTimer {
            kind,
            period,
            next_due: now + period,
        });
    }

    pub fn listen(&mut self, listener: Listener) {
        if !self.disposed && !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    pub fn listens(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn live_timers(&self, kind: TimerKind) -> usize {
        self.timers.iter().filter(|t| t.kind == kind).count()
    }

    /// Timers due at `now`, in registration order. A fired timer is
    /// rescheduled one period after `now`; missed ticks are not replayed.
    pub fn due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for timer in self.timers.iter_mut() {
            if now >= timer.next_due {
                fired.push(timer.kind);
                timer.next_due = now + timer.period;
            }
        }
        fired
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::debug!(
            "Disposing scope '{}' ({} timers, {} listeners)",
            self.label,
            self.timers.len(),
            self.listeners.len()
        );
        self.timers.clear();
        self.listeners.clear();
        self.disposed = true;
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    #[test]
    fn test_timers_fire_once_per_period() {
        let clock = ManualClock::new();
        let mut scope = ViewScope::new("map");
        scope.every(TimerKind::CursorApply, TIMER_PERIOD, clock.now());
        scope.every(TimerKind::HoverRefresh, TIMER_PERIOD, clock.now());

        assert!(scope.due(clock.advance_ms(5)).is_empty());
        assert_eq!(
            scope.due(clock.advance_ms(12)),
            vec![TimerKind::CursorApply, TimerKind::HoverRefresh]
        );
        assert!(scope.due(clock.advance_ms(1)).is_empty());
        // A long stall yields one tick, not a burst.
        assert_eq!(scope.due(clock.advance_ms(500)).len(), 2);
    }

    #[test]
    fn test_dispose_is_idempotent_and_final() {
        let clock = ManualClock::new();
        let mut scope = ViewScope::new("continent");
        scope.every(TimerKind::CursorApply, TIMER_PERIOD, clock.now());
        scope.listen(Listener::MapClick);
        scope.listen(Listener::MapClick);
        assert!(scope.listens(Listener::MapClick));

        scope.dispose();
        scope.dispose();
        assert!(scope.is_disposed());
        assert_eq!(scope.live_timers(TimerKind::CursorApply), 0);
        assert!(!scope.listens(Listener::MapClick));
        assert!(scope.due(clock.advance_ms(100)).is_empty());

        scope.every(TimerKind::HoverRefresh, TIMER_PERIOD, clock.now());
        scope.listen(Listener::ZoomOutButton);
        assert_eq!(scope.live_timers(TimerKind::HoverRefresh), 0);
        assert!(!scope.listens(Listener::ZoomOutButton));
    }
}
