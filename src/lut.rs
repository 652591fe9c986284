//! Color lookup tables for map markers and region fills.
//!
//! A ramp is a list of `(value, color)` steps sorted by value. Lookups between
//! two steps interpolate each channel linearly; values outside the first or
//! last step clamp to the end colors. The `-1` "no data" sentinel sits on its
//! own black plateau below `-0.1` so it never blends into the real scale.

use plotters::style::RGBAColor;

#[derive(Debug, Clone, Copy)]
pub struct ColorStep {
    pub value: f64,
    pub color: RGBAColor,
}

fn step(value: f64, r: u8, g: u8, b: u8, alpha: u8) -> ColorStep {
    ColorStep {
        value,
        color: RGBAColor(r, g, b, alpha as f64 / 255.0),
    }
}

#[derive(Debug, Clone)]
pub struct ColorRamp {
    steps: Vec<ColorStep>,
}

impl ColorRamp {
    pub fn new(mut steps: Vec<ColorStep>) -> Self {
        steps.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { steps }
    }

    /// Marker ramp over new cases per million
    pub fn new_cases_per_million() -> Self {
        Self::new(vec![
            step(-1.0, 0, 0, 0, 255),
            step(-0.1, 0, 0, 0, 255),
            step(0.0, 255, 255, 0, 255),
            step(1000.0, 255, 0, 0, 255),
        ])
    }

    /// Region fill ramp over people vaccinated per hundred
    pub fn people_vaccinated_per_hundred() -> Self {
        Self::new(vec![
            step(-1.0, 0, 0, 0, 100),
            step(-0.1, 0, 0, 0, 100),
            step(0.0, 255, 0, 0, 100),
            step(50.0, 255, 255, 0, 100),
            step(100.0, 0, 255, 0, 100),
        ])
    }

    pub fn lookup(&self, value: f64) -> RGBAColor {
        let (first, last) = match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return RGBAColor(0, 0, 0, 1.0),
        };
        if value.is_nan() || value <= first.value {
            return first.color;
        }
        if value >= last.value {
            return last.color;
        }
        let upper = self.steps.partition_point(|s| s.value <= value);
        let (lo, hi) = (&self.steps[upper - 1], &self.steps[upper]);
        let t = (value - lo.value) / (hi.value - lo.value);
        lerp(lo.color, hi.color, t)
    }
}

fn lerp(a: RGBAColor, b: RGBAColor, t: f64) -> RGBAColor {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBAColor(
        channel(a.0, b.0),
        channel(a.1, b.1),
        channel(a.2, b.2),
        a.3 + (b.3 - a.3) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: RGBAColor) -> (u8, u8, u8) {
        (c.0, c.1, c.2)
    }

    #[test]
    fn test_case_ramp() {
        let ramp = ColorRamp::new_cases_per_million();
        assert_eq!(rgb(ramp.lookup(-1.0)), (0, 0, 0));
        assert_eq!(rgb(ramp.lookup(-0.5)), (0, 0, 0));
        assert_eq!(rgb(ramp.lookup(0.0)), (255, 255, 0));
        assert_eq!(rgb(ramp.lookup(500.0)), (255, 128, 0));
        assert_eq!(rgb(ramp.lookup(5000.0)), (255, 0, 0));
    }

    #[test]
    fn test_vaccination_ramp_is_translucent() {
        let ramp = ColorRamp::people_vaccinated_per_hundred();
        let none = ramp.lookup(-1.0);
        assert_eq!(rgb(none), (0, 0, 0));
        assert!((none.3 - 100.0 / 255.0).abs() < 1e-9);
        assert_eq!(rgb(ramp.lookup(50.0)), (255, 255, 0));
        assert_eq!(rgb(ramp.lookup(75.0)), (128, 255, 0));
        assert_eq!(rgb(ramp.lookup(120.0)), (0, 255, 0));
    }

    #[test]
    fn test_no_data_does_not_blend_into_scale() {
        let ramp = ColorRamp::people_vaccinated_per_hundred();
        let just_below_zero = ramp.lookup(-0.1);
        assert_eq!(rgb(just_below_zero), (0, 0, 0));
        // Between -0.1 and 0 the ramp blends toward red.
        assert_eq!(rgb(ramp.lookup(-0.05)).1, 0);
    }
}
