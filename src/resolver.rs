//! # Point-in-Time Resolver Module
//!
//! Answers "what did country C look like on date D" for the map.
//!
//! ## Policies
//! - Exact date (case and hospital metrics): the sample dated exactly D, if any.
//! - Forward fill (vaccination rate): the latest defined value dated at or
//!   before D, if any.
//!
//! ## Frame Rules
//! - Region fill: forward-filled vaccination rate, or `NO_DATA` (`-1`).
//! - Marker: only when the country has case, vaccination and metadata
//!   records AND both the smoothed case rate and the vaccination rate resolve.

use crate::dataset::{CaseMetric, CountrySeries, DatasetIndex, VaccinationSeries};
use crate::navigation::MapView;
use chrono::NaiveDate;

/// Fill value of a region with no vaccination data yet
pub const NO_DATA: f64 = -1.0;

const MAX_MARKER_SIZE: f64 = 25.0;
const MARKER_SCALE_RATE: f64 = 1000.0;

pub fn resolve_exact(series: &CountrySeries, date: NaiveDate, metric: CaseMetric) -> Option<f64> {
    let idx = series.samples.partition_point(|s| s.date < date);
    series
        .samples
        .get(idx)
        .filter(|s| s.date == date)
        .and_then(|s| metric.of(s))
}

pub fn forward_fill(series: &VaccinationSeries, date: NaiveDate) -> Option<f64> {
    series
        .samples
        .iter()
        .rev()
        .filter(|s| s.date <= date)
        .find_map(|s| s.people_vaccinated_per_hundred)
}

/// Choropleth value of `code` on `date`
#[cfg(test)]
pub fn fill_value(index: &DatasetIndex, code: &str, date: NaiveDate) -> f64 {
    index
        .lookup_vaccination(code)
        .and_then(|series| forward_fill(series, date))
        .unwrap_or(NO_DATA)
}

/// Marker radius for a smoothed new case rate; zero rates get no visible marker.
pub fn marker_size(rate: f64, map: MapView) -> f64 {
    if rate == 0.0 {
        return 0.0;
    }
    let min = match map {
        MapView::World => 1.0,
        MapView::Continent(_) => 5.0,
    };
    (MAX_MARKER_SIZE * rate / MARKER_SCALE_RATE).clamp(min, MAX_MARKER_SIZE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub country_code: String,
    pub lon: f64,
    pub lat: f64,
    /// Smoothed new cases per million, drives size and marker color
    pub value: f64,
    /// People vaccinated per hundred
    pub color_input: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionFill {
    pub country_code: String,
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

/// Everything the map draws for one (view, date)
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub map: MapView,
    pub date: NaiveDate,
    pub markers: Vec<Marker>,
    pub fills: Vec<RegionFill>,
}

impl MapFrame {
    pub fn marker(&self, code: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.country_code == code)
    }

    pub fn fill(&self, code: &str) -> Option<f64> {
        self.fills
            .iter()
            .find(|f| f.country_code == code)
            .map(|f| f.value)
    }
}

pub fn resolve_frame(index: &DatasetIndex, map: MapView, date: NaiveDate) -> MapFrame {
    let mut markers = Vec::new();
    let mut fills = Vec::new();

    for info in index.countries().filter(|info| map.contains(info)) {
        let code = info.code.as_str();
        let vaccinated = index
            .lookup_vaccination(code)
            .and_then(|series| forward_fill(series, date));

        fills.push(RegionFill {
            country_code: info.code.clone(),
            lon: info.longitude,
            lat: info.latitude,
            value: vaccinated.unwrap_or(NO_DATA),
        });

        let rate = index
            .lookup_country(code)
            .and_then(|series| resolve_exact(series, date, CaseMetric::NewCasesSmoothedPerMillion));
        if let (Some(rate), Some(vaccinated)) = (rate, vaccinated) {
            markers.push(Marker {
                country_code: info.code.clone(),
                lon: info.longitude,
                lat: info.latitude,
                value: rate,
                color_input: vaccinated,
                size: marker_size(rate, map),
            });
        }
    }

    MapFrame {
        map,
        date,
        markers,
        fills,
    }
}
