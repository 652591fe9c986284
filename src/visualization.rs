//! # Visualization Helpers Module
//!
//! Coordinate and date-axis helpers shared by the charts and the core.
//!
//! ## Coordinate Spaces
//! - Fractional chart space (`FracPoint`): `0..1` across the drawable area,
//!   origin bottom-left, independent of pixel resolution. Drill-down boundary
//!   boxes are expressed in this space.
//! - Data space (`DataPoint`): longitude/latitude of the active map extent.
//!   Marker proximity is measured here.
//!
//! - Pixel space: only used to place the hover card next to its marker.
//!
//! ## Date Axis
//! Charts plot dates as day offsets from the start of the data range so every
//! panel shares one numeric x axis.

use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracPoint {
    pub x: f32,
    pub y: f32,
}

impl FracPoint {
    /// Convert a position relative to the chart's top-left corner into
    /// fractional coordinates. `None` if the position is outside the chart.
    pub fn from_local(x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let fx = x / width;
        let fy = 1.0 - y / height;
        if (0.0..=1.0).contains(&fx) && (0.0..=1.0).contains(&fy) {
            Some(Self { x: fx, y: fy })
        } else {
            None
        }
    }
}

/// Axis aligned rectangle in fractional chart space, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracRect {
    pub bottom_left: FracPoint,
    pub top_right: FracPoint,
}

impl FracRect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            bottom_left: FracPoint { x: x0, y: y0 },
            top_right: FracPoint { x: x1, y: y1 },
        }
    }

    pub fn contains(&self, p: FracPoint) -> bool {
        p.x >= self.bottom_left.x
            && p.x <= self.top_right.x
            && p.y >= self.bottom_left.y
            && p.y <= self.top_right.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub lon: f64,
    pub lat: f64,
}

impl DataPoint {
    pub fn distance_sq(&self, lon: f64, lat: f64) -> f64 {
        let dx = self.lon - lon;
        let dy = self.lat - lat;
        dx * dx + dy * dy
    }
}

/// Longitude/latitude window shown by a map view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExtent {
    pub lon: (f64, f64),
    pub lat: (f64, f64),
}

impl GeoExtent {
    pub fn to_data(&self, p: FracPoint) -> DataPoint {
        DataPoint {
            lon: self.lon.0 + p.x as f64 * (self.lon.1 - self.lon.0),
            lat: self.lat.0 + p.y as f64 * (self.lat.1 - self.lat.0),
        }
    }

    /// Inverse of `to_data`. Points outside the extent map outside `0..1`.
    pub fn to_fraction(&self, p: DataPoint) -> FracPoint {
        FracPoint {
            x: ((p.lon - self.lon.0) / (self.lon.1 - self.lon.0)) as f32,
            y: ((p.lat - self.lat.0) / (self.lat.1 - self.lat.0)) as f32,
        }
    }
}

/// Hover card size in pixels
pub const CARD_SIZE: (f32, f32) = (280.0, 200.0);
/// Gap between the card and its marker, also the minimum distance to the map edge
pub const CARD_GAP: f32 = 10.0;

/// Top-left pixel offset of the hover card inside a `width` x `height` map,
/// placed up and to the left of the marker at `anchor`.
pub fn card_offset(anchor: FracPoint, width: f32, height: f32) -> (f32, f32) {
    let x = anchor.x * width;
    let y = (1.0 - anchor.y) * height;
    (
        (x - (CARD_SIZE.0 + CARD_GAP)).max(CARD_GAP),
        (y - (CARD_SIZE.1 + CARD_GAP)).max(CARD_GAP),
    )
}

/// Day offset of `date` from `start` as a chart x coordinate
pub fn day_offset(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64
}

/// Date under a fractional x position of a `[start, end]` date axis
pub fn date_at_fraction(start: NaiveDate, end: NaiveDate, fx: f32) -> NaiveDate {
    let span = (end - start).num_days().max(0) as f64;
    let offset = (fx.clamp(0.0, 1.0) as f64 * span).round() as i64;
    start + Duration::days(offset)
}

/// Date from a chart x coordinate produced by `day_offset`
pub fn date_from_offset(start: NaiveDate, offset: f64) -> NaiveDate {
    start + Duration::days(offset.round() as i64)
}

/// Finnish short date, e.g. `11.3.2022`
pub fn format_display_date(date: NaiveDate) -> String {
    format!("{}.{}.{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_from_local_flips_y() {
        let p = FracPoint::from_local(50.0, 30.0, 100.0, 100.0).unwrap();
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.7).abs() < 1e-6);
        assert!(FracPoint::from_local(150.0, 30.0, 100.0, 100.0).is_none());
        assert!(FracPoint::from_local(10.0, 10.0, 0.0, 100.0).is_none());
    }

    #[test]
    fn test_rect_edges_inclusive() {
        let rect = FracRect::new(0.45, 0.64, 0.6, 0.93);
        assert!(rect.contains(FracPoint { x: 0.45, y: 0.64 }));
        assert!(rect.contains(FracPoint { x: 0.6, y: 0.93 }));
        assert!(!rect.contains(FracPoint { x: 0.61, y: 0.7 }));
    }

    #[test]
    fn test_extent_to_data() {
        let extent = GeoExtent {
            lon: (-180.0, 180.0),
            lat: (-60.0, 90.0),
        };
        let p = extent.to_data(FracPoint { x: 0.5, y: 0.0 });
        assert_eq!(p, DataPoint { lon: 0.0, lat: -60.0 });
    }

    #[test]
    fn test_extent_to_fraction_inverts_to_data() {
        let extent = GeoExtent {
            lon: (-25.0, 45.0),
            lat: (34.0, 72.0),
        };
        let at = FracPoint { x: 0.25, y: 0.8 };
        let back = extent.to_fraction(extent.to_data(at));
        assert!((back.x - at.x).abs() < 1e-6);
        assert!((back.y - at.y).abs() < 1e-6);
    }

    #[test]
    fn test_card_offset_sits_above_left_of_marker() {
        // Marker at (800, 400) from the top-left of a 1000x500 map
        let (left, top) = card_offset(FracPoint { x: 0.8, y: 0.2 }, 1000.0, 500.0);
        assert!((left - 510.0).abs() < 1e-3);
        assert!((top - 190.0).abs() < 1e-3);
    }

    #[test]
    fn test_card_offset_clamps_to_map_edge() {
        let (left, top) = card_offset(FracPoint { x: 0.1, y: 0.9 }, 1000.0, 500.0);
        assert_eq!((left, top), (CARD_GAP, CARD_GAP));
    }

    #[test]
    fn test_date_axis_helpers() {
        let start = d("2020-11-01");
        let end = d("2020-11-11");
        assert_eq!(day_offset(start, d("2020-11-04")), 3.0);
        assert_eq!(date_at_fraction(start, end, 0.5), d("2020-11-06"));
        assert_eq!(date_at_fraction(start, end, 7.0), end);
        assert_eq!(date_at_fraction(start, end, -1.0), start);
        assert_eq!(date_from_offset(start, 2.6), d("2020-11-04"));
        assert_eq!(format_display_date(d("2022-03-11")), "11.3.2022");
    }
}
