//! # Time Cursor Module
//!
//! The single "currently displayed date" shared by the map and the timeline.
//!
//! Dragging the timeline handle moves the handle at once but only writes the
//! new date into a pending slot. The map's `CursorApply` timer takes the slot
//! at most once per tick, so a burst of pointer moves costs one map
//! re-resolution per frame and only the latest value is applied.

use crate::visualization::date_at_fraction;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeCursor {
    start: NaiveDate,
    end: NaiveDate,
    displayed: NaiveDate,
    handle: NaiveDate,
    pending: Option<NaiveDate>,
}

impl TimeCursor {
    pub fn new(start: NaiveDate, end: NaiveDate, initial: NaiveDate) -> Self {
        let end = end.max(start);
        let displayed = initial.clamp(start, end);
        Self {
            start,
            end,
            displayed,
            handle: displayed,
            pending: None,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Date the map currently shows
    pub fn displayed(&self) -> NaiveDate {
        self.displayed
    }

    /// Date under the drag handle, possibly ahead of `displayed`
    pub fn handle(&self) -> NaiveDate {
        self.handle
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }

    /// Move the handle and queue the clamped date for the next apply tick.
    pub fn drag_to(&mut self, date: NaiveDate) -> NaiveDate {
        let date = self.clamp(date);
        self.handle = date;
        self.pending = Some(date);
        date
    }

    /// Drag by fractional position along the timeline's x axis.
    pub fn drag_to_fraction(&mut self, fx: f32) -> NaiveDate {
        self.drag_to(date_at_fraction(self.start, self.end, fx))
    }

    /// Apply and clear the pending date. `None` when nothing changed since
    /// the last tick.
    pub fn take_pending(&mut self) -> Option<NaiveDate> {
        let date = self.pending.take()?;
        self.displayed = date;
        Some(date)
    }
}
