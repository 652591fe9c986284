//! # Country Trends Module
//!
//! Data for the four stacked trend panels of the country view. All panels
//! share one x interval, `[series_start, series_end + 1 day]`.
//!
//! In relative mode the case panels plot per-million values with a fixed
//! minimum y range and a faded global average; in actual mode they plot
//! absolute counts fitted to the data and have no average.

use crate::aggregate::GlobalAverages;
use crate::dataset::{CaseMetric, DatasetIndex};
use crate::timeseries::{Point, PointSliceExt, TimeSeries};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendKind {
    Vaccination,
    NewCases,
    HospitalPatients,
    IntensiveCare,
}

impl TrendKind {
    pub const ALL: [TrendKind; 4] = [
        TrendKind::Vaccination,
        TrendKind::NewCases,
        TrendKind::HospitalPatients,
        TrendKind::IntensiveCare,
    ];

    fn case_metric(self, relative: bool) -> Option<CaseMetric> {
        match (self, relative) {
            (TrendKind::Vaccination, _) => None,
            (TrendKind::NewCases, true) => Some(CaseMetric::NewCasesPerMillion),
            (TrendKind::NewCases, false) => Some(CaseMetric::NewCases),
            (TrendKind::HospitalPatients, true) => Some(CaseMetric::HospPatientsPerMillion),
            (TrendKind::HospitalPatients, false) => Some(CaseMetric::HospPatients),
            (TrendKind::IntensiveCare, true) => Some(CaseMetric::IcuPatientsPerMillion),
            (TrendKind::IntensiveCare, false) => Some(CaseMetric::IcuPatients),
        }
    }

    fn title(self, relative: bool) -> &'static str {
        match (self, relative) {
            (TrendKind::Vaccination, _) => "Vaccination rate (at least 1 vaccine)",
            (TrendKind::NewCases, true) => "New cases (relative to population)",
            (TrendKind::NewCases, false) => "New cases",
            (TrendKind::HospitalPatients, true) => "Hospital patients (relative to population)",
            (TrendKind::HospitalPatients, false) => "Hospital patients",
            (TrendKind::IntensiveCare, true) => {
                "Intensive hospital care patients (relative to population)"
            }
            (TrendKind::IntensiveCare, false) => "Intensive hospital care patients",
        }
    }

    fn axis_title(self, relative: bool) -> &'static str {
        match (self, relative) {
            (TrendKind::Vaccination, _) => "Vaccinated (%)",
            (_, true) => "per 1 million citizens",
            (TrendKind::NewCases, false) => "New cases",
            (TrendKind::HospitalPatients, false) => "Hospital patients",
            (TrendKind::IntensiveCare, false) => "Intensive care patients",
        }
    }

    /// Fixed upper y bound, expanded if the data exceeds it. `None` fits the data.
    fn max_y(self, relative: bool) -> Option<f64> {
        match (self, relative) {
            (TrendKind::Vaccination, _) => Some(100.0),
            (TrendKind::NewCases, true) => Some(1000.0),
            (TrendKind::HospitalPatients, true) => Some(100.0),
            (TrendKind::IntensiveCare, true) => Some(50.0),
            (_, false) => None,
        }
    }

    /// Unit-aware value text
    pub fn format_value(self, value: f64, relative: bool) -> String {
        let noun = match self {
            TrendKind::Vaccination => return format!("{value:.1}% received at least 1 vaccine"),
            TrendKind::NewCases => "new cases",
            TrendKind::HospitalPatients => "hospital patients",
            TrendKind::IntensiveCare => "intensive care patients",
        };
        if relative {
            format!("{value:.0} {noun} per 1 million citizens")
        } else {
            format!("{value:.0} {noun}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPanel {
    pub kind: TrendKind,
    pub title: &'static str,
    pub axis_title: &'static str,
    pub series: TimeSeries,
    pub global_average: Option<Arc<TimeSeries>>,
    pub y_range: (f64, f64),
    pub latest_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryPanels {
    pub country_name: String,
    pub show_relative: bool,
    pub x_range: (NaiveDate, NaiveDate),
    pub panels: Vec<TrendPanel>,
}

impl CountryPanels {
    pub fn build(
        index: &DatasetIndex,
        averages: &GlobalAverages,
        code: &str,
        show_relative: bool,
        series_start: NaiveDate,
        series_end: NaiveDate,
    ) -> Self {
        let country_name = index
            .lookup_info(code)
            .map_or_else(|| code.to_string(), |info| info.name.clone());

        let panels = TrendKind::ALL
            .into_iter()
            .map(|kind| {
                let series = match kind.case_metric(show_relative) {
                    None => index
                        .lookup_vaccination(code)
                        .map(|v| {
                            TimeSeries::from_points(v.samples.iter().filter_map(|s| {
                                s.people_vaccinated_per_hundred
                                    .map(|value| Point { date: s.date, value })
                            }))
                        })
                        .unwrap_or_default(),
                    Some(metric) => index
                        .lookup_country(code)
                        .map(|c| {
                            TimeSeries::from_points(c.samples.iter().filter_map(|s| {
                                metric.of(s).map(|value| Point { date: s.date, value })
                            }))
                        })
                        .unwrap_or_default(),
                };
                let series = TimeSeries::from_points(
                    series.points().iter().copied().filter(|p| p.date >= series_start),
                );
                let global_average = kind
                    .case_metric(show_relative)
                    .and_then(|metric| averages.get(metric));
                Self::panel(kind, show_relative, series, global_average)
            })
            .collect();

        Self {
            country_name,
            show_relative,
            x_range: (series_start, series_end + Duration::days(1)),
            panels,
        }
    }

    fn panel(
        kind: TrendKind,
        relative: bool,
        series: TimeSeries,
        global_average: Option<Arc<TimeSeries>>,
    ) -> TrendPanel {
        let data_max = series.points().min_max_value().map(|(_, max)| max);
        let y_max = match (kind.max_y(relative), data_max) {
            (Some(fixed), Some(max)) => fixed.max(max),
            (Some(fixed), None) => fixed,
            (None, Some(max)) if max > 0.0 => max,
            (None, _) => 1.0,
        };
        let latest_label = series
            .last_point()
            .map(|p| kind.format_value(p.value, relative));
        TrendPanel {
            kind,
            title: kind.title(relative),
            axis_title: kind.axis_title(relative),
            series,
            global_average,
            y_range: (0.0, y_max),
            latest_label,
        }
    }

    /// Label of the relative/actual toggle
    pub fn toggle_label(&self) -> &'static str {
        if self.show_relative {
            "Show actual values"
        } else {
            "Show relative values"
        }
    }
}
