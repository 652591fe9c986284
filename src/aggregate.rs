//! # Temporal Aggregation Module
//!
//! One-time passes over every country's samples, run eagerly after the
//! dataset is loaded:
//!
//! - `GlobalTimeline`: daily global new case total and mean vaccination rate
//!   for the timeline strip.
//! - `GlobalAverages`: daily mean of the per-million metrics, shared by every
//!   country view opened later.
//!
//! Dates on which no country reports a metric are absent from the output,
//! never zero. Both passes are pure functions of the index.

use crate::dataset::{CaseMetric, DatasetIndex};
use crate::timeseries::TimeSeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Metrics that have a global per-capita average
pub const AVERAGED_METRICS: [CaseMetric; 3] = [
    CaseMetric::NewCasesPerMillion,
    CaseMetric::HospPatientsPerMillion,
    CaseMetric::IcuPatientsPerMillion,
];

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group-by-date accumulation. Entries only exist for dates that saw a value,
/// so `count` is never zero.
#[derive(Debug, Default)]
struct DailyGroups {
    days: BTreeMap<NaiveDate, Accumulator>,
}

impl DailyGroups {
    fn add(&mut self, date: NaiveDate, value: Option<f64>) {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.days.entry(date).or_default().add(value);
        }
    }

    fn sums(&self) -> TimeSeries {
        self.collect(|acc| acc.sum)
    }

    fn means(&self) -> TimeSeries {
        self.collect(Accumulator::mean)
    }

    fn collect(&self, f: impl Fn(&Accumulator) -> f64) -> TimeSeries {
        let mut series = TimeSeries::new();
        for (date, acc) in &self.days {
            series.add_point(*date, f(acc));
        }
        series
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalTimeline {
    pub new_cases: TimeSeries,
    pub vaccinated: TimeSeries,
}

impl GlobalTimeline {
    pub fn compute(index: &DatasetIndex, series_start: NaiveDate) -> Self {
        let started = Instant::now();
        let mut cases = DailyGroups::default();
        for (_, series) in index.case_series() {
            for sample in series.samples.iter().filter(|s| s.date >= series_start) {
                cases.add(sample.date, sample.new_cases);
            }
        }

        let mut vaccinated = DailyGroups::default();
        for (_, series) in index.vaccination_series() {
            for sample in series.samples.iter().filter(|s| s.date >= series_start) {
                vaccinated.add(sample.date, sample.people_vaccinated_per_hundred);
            }
        }

        let timeline = Self {
            new_cases: cases.sums(),
            vaccinated: vaccinated.means(),
        };
        log::info!(
            "Computed global timeline ({} days) in {:?}",
            timeline.new_cases.len(),
            started.elapsed()
        );
        timeline
    }
}

/// Global per-capita averages, one immutable series per metric
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalAverages {
    series: BTreeMap<CaseMetric, Arc<TimeSeries>>,
}

impl GlobalAverages {
    pub fn compute(index: &DatasetIndex, series_start: NaiveDate) -> Self {
        let started = Instant::now();
        let mut series = BTreeMap::new();
        for metric in AVERAGED_METRICS {
            let mut groups = DailyGroups::default();
            for (_, country) in index.case_series() {
                for sample in country.samples.iter().filter(|s| s.date >= series_start) {
                    groups.add(sample.date, metric.of(sample));
                }
            }
            let means = groups.means();
            log::debug!("{}: {} averaged days", metric.key(), means.len());
            series.insert(metric, Arc::new(means));
        }
        log::info!("Computed global averages in {:?}", started.elapsed());
        Self { series }
    }

    pub fn get(&self, metric: CaseMetric) -> Option<Arc<TimeSeries>> {
        self.series.get(&metric).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_timeline_sums_cases_and_averages_vaccinations() {
        let index = fixtures::index();
        let timeline = GlobalTimeline::compute(&index, d("2020-11-01"));

        assert_eq!(timeline.new_cases.value_at(d("2021-06-01")), Some(6650.0));
        assert_eq!(timeline.new_cases.value_at(d("2021-05-31")), Some(200.0));
        // Only FIN's sample on 06-02, and it has no new_cases.
        assert_eq!(timeline.new_cases.value_at(d("2021-06-02")), None);

        assert_eq!(timeline.vaccinated.value_at(d("2021-06-02")), Some(40.0));
        assert_eq!(timeline.vaccinated.value_at(d("2021-06-05")), None);
        assert_eq!(timeline.vaccinated.points().first().map(|p| p.date), Some(d("2021-05-01")));
    }

    #[test]
    fn test_timeline_drops_dates_before_start() {
        let index = fixtures::index();
        let timeline = GlobalTimeline::compute(&index, d("2021-06-01"));
        assert!(timeline.new_cases.points().iter().all(|p| p.date >= d("2021-06-01")));
        assert!(timeline.vaccinated.value_at(d("2021-05-28")).is_none());
    }

    #[test]
    fn test_averages_only_count_reporting_countries() {
        let index = fixtures::index();
        let averages = GlobalAverages::compute(&index, d("2020-11-01"));

        let cases = averages.get(CaseMetric::NewCasesPerMillion).unwrap();
        let mean = cases.value_at(d("2021-06-01")).unwrap();
        assert!((mean - (117.3 + 98.9 + 23.5) / 3.0).abs() < 1e-9);

        let icu = averages.get(CaseMetric::IcuPatientsPerMillion).unwrap();
        assert_eq!(icu.value_at(d("2021-05-31")), None);
        assert!((icu.value_at(d("2021-06-01")).unwrap() - 1.0).abs() < 1e-9);
        assert!(icu.points().iter().all(|p| !p.value.is_nan()));

        assert!(averages.get(CaseMetric::NewCases).is_none());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let index = fixtures::index();
        let start = d("2020-11-01");
        assert_eq!(GlobalTimeline::compute(&index, start), GlobalTimeline::compute(&index, start));
        let a = GlobalAverages::compute(&index, start);
        let b = GlobalAverages::compute(&index, start);
        for metric in AVERAGED_METRICS {
            let (a, b) = (a.get(metric).unwrap(), b.get(metric).unwrap());
            let bits = |s: &TimeSeries| {
                s.points().iter().map(|p| p.value.to_bits()).collect::<Vec<_>>()
            };
            assert_eq!(bits(a.as_ref()), bits(b.as_ref()));
        }
    }
}
