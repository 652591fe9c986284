//! # Time Series Module
//!
//! Date-indexed series of scalar values used for every derived line on the
//! dashboard (global totals, global averages, trend panels, info card lines).
//!
//! Points are appended in progressive-x order; an out-of-order append is
//! rejected so consumers can rely on binary search over dates.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    data: Vec<Point>,
}

pub trait PointSliceExt {
    fn min_max_value(&self) -> Option<(f64, f64)>;
}

// Implement the trait for a slice of `Point`
impl PointSliceExt for &[Point] {
    fn min_max_value(&self) -> Option<(f64, f64)> {
        self.iter().fold(None, |acc, point| match acc {
            None => Some((point.value, point.value)),
            Some((min, max)) => Some((min.min(point.value), max.max(point.value))),
        })
    }
}

impl TimeSeries {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Build from points already sorted by date; out-of-order points are dropped.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut series = Self::new();
        for point in points {
            series.add_point(point.date, point.value);
        }
        series
    }

    /// Append a point. Returns false (and ignores the point) if `date` is
    /// earlier than the last appended date.
    pub fn add_point(&mut self, date: NaiveDate, value: f64) -> bool {
        if let Some(last) = self.data.last() {
            if date < last.date {
                return false;
            }
        }
        self.data.push(Point { date, value });
        true
    }

    pub fn points(&self) -> &[Point] {
        &self.data
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.data.last()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Points whose date lies in `[start, end]`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> &[Point] {
        let lo = self.data.partition_point(|p| p.date < start);
        let hi = self.data.partition_point(|p| p.date <= end);
        if lo >= hi {
            return &[];
        }
        &self.data[lo..hi]
    }

    /// Exact-date lookup.
    #[cfg(test)]
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.data.partition_point(|p| p.date < date);
        self.data
            .get(idx)
            .filter(|p| p.date == date)
            .map(|p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_rejects_out_of_order_append() {
        let mut ts = TimeSeries::new();
        assert!(ts.add_point(d("2021-01-02"), 1.0));
        assert!(!ts.add_point(d("2021-01-01"), 2.0));
        assert!(ts.add_point(d("2021-01-02"), 3.0));
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn test_range_is_inclusive() {
        let ts = TimeSeries::from_points((1..=9).map(|day| Point {
            date: d(&format!("2021-03-0{}", day)),
            value: day as f64,
        }));
        let slice = ts.range(d("2021-03-03"), d("2021-03-05"));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].value, 3.0);
        assert_eq!(slice[2].value, 5.0);
        assert!(ts.range(d("2021-04-01"), d("2021-04-05")).is_empty());
    }

    #[test]
    fn test_value_at_and_min_max() {
        let ts = TimeSeries::from_points(vec![
            Point { date: d("2021-01-01"), value: 4.0 },
            Point { date: d("2021-01-03"), value: -2.0 },
        ]);
        assert_eq!(ts.value_at(d("2021-01-03")), Some(-2.0));
        assert_eq!(ts.value_at(d("2021-01-02")), None);

        let points = ts.points();
        assert_eq!(points.min_max_value(), Some((-2.0, 4.0)));
    }
}
