//! # Country Proximity Module
//!
//! Resolves the plotted marker nearest to the pointer and drives the hover
//! info card.
//!
//! Pointer moves only record state: the nearest marker becomes the hover
//! target and the "last pointed" country. The card is rebuilt at the
//! `HoverRefresh` tick, and only when the target differs from the country the
//! card already shows.
//!
//! `last_pointed` survives pointer leave; it is what a deferred map click
//! drills into when no continent box matches.

use crate::resolver::{MapFrame, Marker};
use crate::visualization::{DataPoint, FracPoint, GeoExtent};

/// Marker nearest to `at` in data space
pub fn nearest_marker(frame: &MapFrame, at: DataPoint) -> Option<&Marker> {
    frame
        .markers
        .iter()
        .min_by(|a, b| at.distance_sq(a.lon, a.lat).total_cmp(&at.distance_sq(b.lon, b.lat)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverTarget {
    pub country_code: String,
    /// Marker position the card is anchored to
    pub anchor: DataPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverUpdate {
    /// Rebuild the card for a new country
    Show(HoverTarget),
    /// No active country; fade the card out
    Hide,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    target: Option<HoverTarget>,
    active: Option<String>,
    last_pointed: Option<String>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, frame: &MapFrame, extent: &GeoExtent, at: FracPoint) {
        if let Some(marker) = nearest_marker(frame, extent.to_data(at)) {
            self.last_pointed = Some(marker.country_code.clone());
            self.target = Some(HoverTarget {
                country_code: marker.country_code.clone(),
                anchor: DataPoint {
                    lon: marker.lon,
                    lat: marker.lat,
                },
            });
        }
    }

    pub fn pointer_left(&mut self) {
        self.target = None;
        self.active = None;
    }

    pub fn last_pointed(&self) -> Option<&str> {
        self.last_pointed.as_deref()
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Consume the hover target recorded since the previous tick.
    pub fn tick(&mut self) -> HoverUpdate {
        let target = self.target.take();
        if let Some(target) = target {
            if self.active.as_deref() != Some(target.country_code.as_str()) {
                self.active = Some(target.country_code.clone());
                return HoverUpdate::Show(target);
            }
        }
        if self.active.is_none() {
            HoverUpdate::Hide
        } else {
            HoverUpdate::Unchanged
        }
    }
}
