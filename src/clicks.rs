//! # Click Disambiguation Module
//!
//! The input surface reports presses only. A second press soon after the first
//! is reported as both a click and a double-click, so the two events are not
//! exclusive. This module turns that stream into at most one semantic action
//! per gesture.
//!
//! ## States
//! - `Idle`
//! - `PendingSingle { deadline }`: a click arrived, its action is deferred
//!   until `deadline`; a double-click before then cancels it.
//!
//! A deferred single click is also dropped if a double-click happened within
//! `DOUBLE_CLICK_SUPPRESSION` of its deadline, which covers the trailing click
//! of a double-click gesture.

use crate::visualization::FracPoint;
use std::time::{Duration, Instant};

/// Delay before a click is committed as a single click
pub const SINGLE_CLICK_DELAY: Duration = Duration::from_millis(200);
/// Two presses closer than this form a double-click
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);
pub const DOUBLE_CLICK_SUPPRESSION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Click {
    Single(FracPoint),
    Double(FracPoint),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClickState {
    Idle,
    PendingSingle { deadline: Instant, at: FracPoint },
}

#[derive(Debug, Clone)]
pub struct ClickDetector {
    state: ClickState,
    last_press: Option<Instant>,
    last_double: Option<Instant>,
}

impl Default for ClickDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickDetector {
    pub fn new() -> Self {
        Self {
            state: ClickState::Idle,
            last_press: None,
            last_double: None,
        }
    }

    /// Feed a raw press. Emits the double-click immediately if this press
    /// completes one; single clicks only come out of `poll`.
    pub fn press(&mut self, now: Instant, at: FracPoint) -> Option<Click> {
        let is_double = self
            .last_press
            .is_some_and(|prev| now.saturating_duration_since(prev) <= DOUBLE_CLICK_WINDOW);
        // A triple press starts a fresh gesture rather than a second double.
        self.last_press = if is_double { None } else { Some(now) };

        self.click(now, at);
        if is_double {
            Some(self.double_click(now, at))
        } else {
            None
        }
    }

    pub fn click(&mut self, now: Instant, at: FracPoint) {
        self.state = ClickState::PendingSingle {
            deadline: now + SINGLE_CLICK_DELAY,
            at,
        };
    }

    pub fn double_click(&mut self, now: Instant, at: FracPoint) -> Click {
        self.last_double = Some(now);
        self.state = ClickState::Idle;
        Click::Double(at)
    }

    /// Commit a deferred single click whose deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Click> {
        match self.state {
            ClickState::PendingSingle { deadline, at } if now >= deadline => {
                self.state = ClickState::Idle;
                let recently_doubled = self.last_double.is_some_and(|t| {
                    now.saturating_duration_since(t) < DOUBLE_CLICK_SUPPRESSION
                });
                if recently_doubled {
                    None
                } else {
                    Some(Click::Single(at))
                }
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, ClickState::PendingSingle { .. })
    }
}
