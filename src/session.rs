//! # Dashboard Session Module
//!
//! Explicit state for one running dashboard. Nothing here is global: the
//! shared dataset and aggregates are an `Arc<DashboardData>`, and every other
//! piece of mutable state (navigator, time cursor, active view resources,
//! frame cache) is owned by the `Session`, so several sessions can coexist
//! and tests build isolated ones.
//!
//! ## Input Flow
//! - Widget events call `pointer_moved`, `pointer_left`, `map_pressed`,
//!   `trend_pressed`, `zoom_out_pressed`, `toggle_relative_values` and
//!   `drag_cursor`. These only record state or hand presses to the navigator.
//! - `tick` resolves deferred clicks first, then runs the active view's due
//!   timers: `CursorApply` re-resolves the map for a pending cursor date and
//!   `HoverRefresh` updates the info card.
//!
//! A deferred map click reads the last pointed country when it resolves, so a
//! pointer move recorded during the 200 ms deferral wins over the one under
//! the press.

use crate::aggregate::{GlobalAverages, GlobalTimeline};
use crate::config::Config;
use crate::cursor::TimeCursor;
use crate::dataset::DatasetIndex;
use crate::error::DatasetError;
use crate::frame_cache::FrameCache;
use crate::info_card::InfoCard;
use crate::navigation::{MapView, Navigator, PressTarget, Transition, View};
use crate::proximity::{HoverTracker, HoverUpdate};
use crate::resolver::MapFrame;
use crate::scope::TimerKind;
use crate::trends::CountryPanels;
use crate::visualization::FracPoint;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

/// First date shown on every time axis
pub fn series_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 11, 1).unwrap_or_default()
}

/// Dataset plus everything derived from it at startup. Immutable.
#[derive(Debug)]
pub struct DashboardData {
    pub index: DatasetIndex,
    pub timeline: GlobalTimeline,
    pub averages: GlobalAverages,
    pub series_start: NaiveDate,
    pub series_end: NaiveDate,
}

impl DashboardData {
    pub fn build(index: DatasetIndex, reference_country: &str) -> Self {
        let series_start = series_start();
        let series_end = index
            .last_case_date(reference_country)
            .unwrap_or(series_start)
            .max(series_start);
        let timeline = GlobalTimeline::compute(&index, series_start);
        let averages = GlobalAverages::compute(&index, series_start);
        Self {
            index,
            timeline,
            averages,
            series_start,
            series_end,
        }
    }

    /// Load all three datasets, then aggregate. Nothing is built unless every
    /// document loaded.
    pub async fn load(config: Config) -> Result<Self, DatasetError> {
        let index = DatasetIndex::load(&config).await?;
        Ok(Self::build(index, &config.reference_country))
    }
}

#[derive(Debug)]
pub struct MapResources {
    pub map: MapView,
    pub frame: Arc<MapFrame>,
    pub hover: HoverTracker,
    pub card: Option<InfoCard>,
    /// The card stays built while hidden so it can fade out.
    pub card_visible: bool,
}

#[derive(Debug)]
pub enum ViewResources {
    Map(MapResources),
    Country(CountryPanels),
}

#[derive(Debug)]
pub struct Session {
    data: Arc<DashboardData>,
    navigator: Navigator,
    cursor: TimeCursor,
    resources: ViewResources,
    frames: FrameCache,
}

impl Session {
    pub fn new(data: Arc<DashboardData>, config: &Config, now: Instant) -> Self {
        let navigator = Navigator::new(config.show_relative_values, now);
        let cursor =
            TimeCursor::new(data.series_start, data.series_end, config.initial_display_date);
        let mut frames = FrameCache::new(config.frame_cache_size);
        let resources = Self::build_resources(&data, navigator.view(), &cursor, &mut frames);
        Self {
            data,
            navigator,
            cursor,
            resources,
            frames,
        }
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn view(&self) -> &View {
        self.navigator.view()
    }

    #[cfg(test)]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn cursor(&self) -> &TimeCursor {
        &self.cursor
    }

    pub fn resources(&self) -> &ViewResources {
        &self.resources
    }

    pub fn pointer_moved(&mut self, at: FracPoint) {
        if let ViewResources::Map(map) = &mut self.resources {
            map.hover.pointer_moved(&map.frame, &map.map.extent(), at);
        }
    }

    pub fn pointer_left(&mut self) {
        if let ViewResources::Map(map) = &mut self.resources {
            map.hover.pointer_left();
        }
    }

    pub fn map_pressed(&mut self, at: FracPoint, now: Instant) -> Option<Transition> {
        let transition = self.navigator.press(PressTarget::Map, at, now)?;
        Some(self.apply(transition))
    }

    pub fn trend_pressed(&mut self, at: FracPoint, now: Instant) -> Option<Transition> {
        let transition = self.navigator.press(PressTarget::TrendPanel, at, now)?;
        Some(self.apply(transition))
    }

    pub fn zoom_out_pressed(&mut self, now: Instant) -> Option<Transition> {
        let transition = self.navigator.zoom_out_pressed(now)?;
        Some(self.apply(transition))
    }

    pub fn toggle_relative_values(&mut self, now: Instant) -> Option<Transition> {
        let transition = self.navigator.toggle_relative_values(now)?;
        Some(self.apply(transition))
    }

    /// Drag the timeline handle to a fractional x position.
    pub fn drag_cursor(&mut self, fx: f32) -> NaiveDate {
        self.cursor.drag_to_fraction(fx)
    }

    /// Advance deferred clicks and the active view's timers to `now`.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        let last_pointed = match &self.resources {
            ViewResources::Map(map) => map.hover.last_pointed().map(str::to_string),
            ViewResources::Country(_) => None,
        };
        if let Some(transition) = self.navigator.poll_clicks(now, last_pointed.as_deref()) {
            return Some(self.apply(transition));
        }

        for timer in self.navigator.due_timers(now) {
            match timer {
                TimerKind::CursorApply => self.apply_pending_cursor(),
                TimerKind::HoverRefresh => self.refresh_hover(),
            }
        }
        None
    }

    fn apply_pending_cursor(&mut self) {
        let ViewResources::Map(map) = &mut self.resources else {
            return;
        };
        if let Some(date) = self.cursor.take_pending() {
            map.frame = self.frames.frame(&self.data.index, map.map, date);
        }
    }

    fn refresh_hover(&mut self) {
        let ViewResources::Map(map) = &mut self.resources else {
            return;
        };
        match map.hover.tick() {
            HoverUpdate::Show(target) => {
                let card = InfoCard::build(
                    &self.data.index,
                    &target.country_code,
                    self.cursor.displayed(),
                    target.anchor,
                );
                if card.is_some() {
                    map.card = card;
                    map.card_visible = true;
                }
            }
            HoverUpdate::Hide => map.card_visible = false,
            HoverUpdate::Unchanged => {}
        }
    }

    fn apply(&mut self, transition: Transition) -> Transition {
        self.resources = Self::build_resources(
            &self.data,
            self.navigator.view(),
            &self.cursor,
            &mut self.frames,
        );
        transition
    }

    fn build_resources(
        data: &DashboardData,
        view: &View,
        cursor: &TimeCursor,
        frames: &mut FrameCache,
    ) -> ViewResources {
        match view {
            View::Map(map) => ViewResources::Map(MapResources {
                map: *map,
                frame: frames.frame(&data.index, *map, cursor.displayed()),
                hover: HoverTracker::new(),
                card: None,
                card_visible: false,
            }),
            View::Country(focus) => ViewResources::Country(CountryPanels::build(
                &data.index,
                &data.averages,
                &focus.code,
                focus.show_relative,
                data.series_start,
                data.series_end,
            )),
        }
    }
}
