//! # Hover Info Card Module
//!
//! The card shown next to the hovered marker: four small line series covering
//! the 30 days up to the displayed date (not wall-clock now), each with a
//! callout at its last point.
//!
//! Each series keeps only the samples where its per-million (or per-hundred)
//! value is defined. Callouts show the latest defined absolute count for case
//! metrics and the latest rate for vaccinations.

use crate::dataset::{CaseMetric, CaseSample, DatasetIndex, VaccinationSample};
use crate::timeseries::{Point, PointSliceExt, TimeSeries};
use crate::visualization::DataPoint;
use chrono::{Duration, NaiveDate};
use plotters::style::RGBColor;

pub const HISTORY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMetric {
    Vaccinations,
    NewCases,
    Hospitalized,
    SevereCases,
}

impl CardMetric {
    pub const ALL: [CardMetric; 4] = [
        CardMetric::Vaccinations,
        CardMetric::NewCases,
        CardMetric::Hospitalized,
        CardMetric::SevereCases,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CardMetric::Vaccinations => "Vaccinations",
            CardMetric::NewCases => "New cases",
            CardMetric::Hospitalized => "Hospitalized",
            CardMetric::SevereCases => "Severe cases",
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            CardMetric::Vaccinations => RGBColor(0, 255, 0),
            CardMetric::NewCases => RGBColor(255, 255, 0),
            CardMetric::Hospitalized => RGBColor(255, 127, 0),
            CardMetric::SevereCases => RGBColor(255, 0, 0),
        }
    }

    /// Lower bound of the y range's upper end
    pub fn high_value(self) -> f64 {
        match self {
            CardMetric::Vaccinations => 100.0,
            CardMetric::NewCases => 1000.0,
            CardMetric::Hospitalized => 100.0,
            CardMetric::SevereCases => 50.0,
        }
    }

    /// (plotted per-capita metric, absolute metric for the callout)
    fn case_metrics(self) -> Option<(CaseMetric, CaseMetric)> {
        match self {
            CardMetric::Vaccinations => None,
            CardMetric::NewCases => Some((CaseMetric::NewCasesPerMillion, CaseMetric::NewCases)),
            CardMetric::Hospitalized => {
                Some((CaseMetric::HospPatientsPerMillion, CaseMetric::HospPatients))
            }
            CardMetric::SevereCases => {
                Some((CaseMetric::IcuPatientsPerMillion, CaseMetric::IcuPatients))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub text: String,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardSeries {
    pub metric: CardMetric,
    pub points: TimeSeries,
    pub callout: Option<Callout>,
    pub y_max: f64,
}

impl CardSeries {
    fn new(metric: CardMetric, points: TimeSeries, latest_text: Option<String>) -> Self {
        let y_max = points
            .points()
            .min_max_value()
            .map_or(metric.high_value(), |(_, max)| max.max(metric.high_value()));
        // No callout without a plotted point to hang it on.
        let callout = points
            .last_point()
            .copied()
            .zip(latest_text)
            .map(|(at, text)| Callout { text, at });
        Self {
            metric,
            points,
            callout,
            y_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoCard {
    pub country_code: String,
    pub title: String,
    pub window: (NaiveDate, NaiveDate),
    pub anchor: DataPoint,
    pub series: Vec<CardSeries>,
}

impl InfoCard {
    /// Build the card for `code` as of `displayed`. `None` when the country
    /// lacks any of the three records.
    pub fn build(
        index: &DatasetIndex,
        code: &str,
        displayed: NaiveDate,
        anchor: DataPoint,
    ) -> Option<Self> {
        let info = index.lookup_info(code)?;
        let cases = index.lookup_country(code)?;
        let vaccinations = index.lookup_vaccination(code)?;

        let start = displayed - Duration::days(HISTORY_DAYS);
        let in_window = |date: NaiveDate| date >= start && date <= displayed;
        let case_window: Vec<&CaseSample> =
            cases.samples.iter().filter(|s| in_window(s.date)).collect();
        let vaccination_window: Vec<&VaccinationSample> =
            vaccinations.samples.iter().filter(|s| in_window(s.date)).collect();

        let series = CardMetric::ALL
            .into_iter()
            .map(|metric| match metric.case_metrics() {
                None => {
                    let points = TimeSeries::from_points(vaccination_window.iter().filter_map(|s| {
                        s.people_vaccinated_per_hundred
                            .map(|value| Point { date: s.date, value })
                    }));
                    let text = points.last_point().map(|p| format!("{:.1}%", p.value));
                    CardSeries::new(metric, points, text)
                }
                Some((plotted, absolute)) => {
                    let points = TimeSeries::from_points(case_window.iter().filter_map(|s| {
                        plotted.of(s).map(|value| Point { date: s.date, value })
                    }));
                    let text = case_window
                        .iter()
                        .rev()
                        .find_map(|s| absolute.of(s))
                        .map(|count| count.to_string());
                    CardSeries::new(metric, points, text)
                }
            })
            .collect();

        Some(Self {
            country_code: code.to_string(),
            title: format!("{} previous 4 weeks", info.name),
            window: (start, displayed),
            anchor,
            series,
        })
    }

    #[cfg(test)]
    pub fn series(&self, metric: CardMetric) -> Option<&CardSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;

    const ANCHOR: DataPoint = DataPoint { lon: 26.0, lat: 64.0 };

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_card_window_follows_displayed_date() {
        let index = fixtures::index();
        let card = InfoCard::build(&index, "FIN", d("2021-06-01"), ANCHOR).unwrap();
        assert_eq!(card.title, "Finland previous 4 weeks");
        assert_eq!(card.window, (d("2021-05-02"), d("2021-06-01")));

        let vacc = card.series(CardMetric::Vaccinations).unwrap();
        assert_eq!(vacc.points.len(), 2);
        let callout = vacc.callout.as_ref().unwrap();
        assert_eq!(callout.text, "45.2%");
        assert_eq!(callout.at.date, d("2021-05-28"));
        assert_eq!(vacc.y_max, 100.0);
    }

    #[test]
    fn test_case_callouts_show_absolute_counts() {
        let index = fixtures::index();
        let card = InfoCard::build(&index, "FIN", d("2021-06-02"), ANCHOR).unwrap();

        let cases = card.series(CardMetric::NewCases).unwrap();
        assert_eq!(cases.points.len(), 2);
        let callout = cases.callout.as_ref().unwrap();
        assert_eq!(callout.text, "650");
        assert_eq!(callout.at, Point { date: d("2021-06-01"), value: 117.3 });

        // icu_patients_per_million is only reported on 06-01.
        let severe = card.series(CardMetric::SevereCases).unwrap();
        assert_eq!(severe.points.len(), 1);
        assert_eq!(severe.callout.as_ref().unwrap().text, "4");
    }

    #[test]
    fn test_empty_series_have_no_callout() {
        let index = fixtures::index();
        let card = InfoCard::build(&index, "SWE", d("2021-06-01"), ANCHOR).unwrap();
        let hosp = card.series(CardMetric::Hospitalized).unwrap();
        assert!(hosp.points.is_empty());
        assert!(hosp.callout.is_none());
        assert_eq!(hosp.y_max, 100.0);
        assert!(card.series(CardMetric::Vaccinations).unwrap().callout.is_none());
    }

    #[test]
    fn test_missing_records_yield_no_card() {
        let index = fixtures::index();
        assert!(InfoCard::build(&index, "NOR", d("2021-06-01"), ANCHOR).is_none());
        assert!(InfoCard::build(&index, "XYZ", d("2021-06-01"), ANCHOR).is_none());
    }
}
