//! # Charts Module
//!
//! plotters charts embedded through plotters-iced. Charts only draw and
//! translate canvas events into `Message`s with fractional coordinates; every
//! decision happens in the session.
//!
//! The map chart has no margins or label areas, so its drawable area is the
//! widget bounds and fractional pointer positions line up with the map extent.

use crate::app::Message;
use crate::cursor::TimeCursor;
use crate::info_card::InfoCard;
use crate::lut::ColorRamp;
use crate::session::{DashboardData, MapResources};
use crate::timeseries::{Point, PointSliceExt};
use crate::trends::TrendPanel;
use crate::visualization::{date_from_offset, day_offset, format_display_date, FracPoint};
use chrono::NaiveDate;
use iced::event::Status;
use iced::mouse::{self, Cursor};
use iced::widget::canvas::Event;
use iced::Rectangle;
use plotters::chart::ChartBuilder;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::{Circle, Rectangle as Rect, Text};
use plotters::series::LineSeries;
use plotters::style::{Color, IntoFont, RGBColor, BLUE, GREEN, RED, WHITE};
use plotters_iced::{Chart, DrawingBackend};

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const BACKGROUND: RGBColor = RGBColor(245, 245, 240);

const TIMELINE_MARGIN: f32 = 10.0;
const TIMELINE_Y_LABEL_AREA: f32 = 60.0;
const TIMELINE_Y2_LABEL_AREA: f32 = 40.0;

/// Fraction of the map's longitude span covered by one region fill tile
const REGION_TILE: f64 = 0.012;

fn local_fraction(bounds: Rectangle, cursor: Cursor) -> Option<FracPoint> {
    let local = cursor.position_in(bounds)?;
    FracPoint::from_local(local.x, local.y, bounds.width, bounds.height)
}

fn offsets(start: NaiveDate, points: &[Point]) -> impl Iterator<Item = (f64, f64)> + '_ {
    points.iter().map(move |p| (day_offset(start, p.date), p.value))
}

// Map

#[derive(Debug, Default)]
pub struct MapPointerState {
    inside: bool,
}

pub struct MapChart<'a> {
    pub resources: &'a MapResources,
}

impl<'a> MapChart<'a> {
    fn draw<DB: DrawingBackend>(&self, mut builder: ChartBuilder<DB>) -> DrawResult<DB> {
        let extent = self.resources.map.extent();
        let frame = &self.resources.frame;
        let markers = ColorRamp::new_cases_per_million();
        let fills = ColorRamp::people_vaccinated_per_hundred();

        let mut chart = builder
            .margin(0)
            .x_label_area_size(0)
            .y_label_area_size(0)
            .build_cartesian_2d(extent.lon.0..extent.lon.1, extent.lat.0..extent.lat.1)?;

        chart.plotting_area().fill(&RGBColor(205, 220, 235))?;

        let half = (extent.lon.1 - extent.lon.0) * REGION_TILE;
        chart.draw_series(frame.fills.iter().map(|fill| {
            Rect::new(
                [(fill.lon - half, fill.lat - half), (fill.lon + half, fill.lat + half)],
                fills.lookup(fill.value).filled(),
            )
        }))?;

        chart.draw_series(frame.markers.iter().filter(|m| m.size > 0.0).map(|marker| {
            Circle::new(
                (marker.lon, marker.lat),
                marker.size.round() as i32,
                markers.lookup(marker.value).filled(),
            )
        }))?;

        Ok(())
    }
}

impl<'a> Chart<Message> for MapChart<'a> {
    type State = MapPointerState;

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, builder: ChartBuilder<DB>) {
        if let Err(e) = self.draw(builder) {
            log::warn!("Failed to draw map: {}", e);
        }
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (Status, Option<Message>) {
        let Event::Mouse(event) = event else {
            return (Status::Ignored, None);
        };
        match event {
            mouse::Event::CursorMoved { .. } => match local_fraction(bounds, cursor) {
                Some(at) => {
                    state.inside = true;
                    (Status::Ignored, Some(Message::MapPointer(at, bounds.size())))
                }
                None if state.inside => {
                    state.inside = false;
                    (Status::Ignored, Some(Message::MapPointerLeft))
                }
                None => (Status::Ignored, None),
            },
            mouse::Event::CursorLeft if state.inside => {
                state.inside = false;
                (Status::Ignored, Some(Message::MapPointerLeft))
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                match local_fraction(bounds, cursor) {
                    Some(at) => (Status::Captured, Some(Message::MapPressed(at))),
                    None => (Status::Ignored, None),
                }
            }
            _ => (Status::Ignored, None),
        }
    }
}

// Global timeline

#[derive(Debug, Default)]
pub struct TimelineDragState {
    dragging: bool,
}

pub struct TimelineChart<'a> {
    pub data: &'a DashboardData,
    pub cursor: &'a TimeCursor,
}

impl<'a> TimelineChart<'a> {
    /// Fractional x of an absolute position inside the plotting area, which
    /// excludes margins and both label areas. Not clamped.
    fn plot_fraction(bounds: Rectangle, position: iced::Point) -> Option<f32> {
        let left = bounds.x + TIMELINE_MARGIN + TIMELINE_Y_LABEL_AREA;
        let width = bounds.width
            - 2.0 * TIMELINE_MARGIN
            - TIMELINE_Y_LABEL_AREA
            - TIMELINE_Y2_LABEL_AREA;
        (width > 0.0).then(|| (position.x - left) / width)
    }

    fn draw<DB: DrawingBackend>(&self, mut builder: ChartBuilder<DB>) -> DrawResult<DB> {
        let start = self.cursor.start();
        let x_max = day_offset(start, self.cursor.end()).max(1.0);
        let cases = self.data.timeline.new_cases.points();
        let vaccinated = self.data.timeline.vaccinated.points();
        let y_max = cases.min_max_value().map_or(1.0, |(_, max)| (max * 1.1).max(1.0));

        let mut chart = builder
            .margin(TIMELINE_MARGIN as i32)
            .caption("Global CoVID daily new cases history", ("sans-serif", 16))
            .x_label_area_size(24)
            .y_label_area_size(TIMELINE_Y_LABEL_AREA as i32)
            .right_y_label_area_size(TIMELINE_Y2_LABEL_AREA as i32)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)?
            .set_secondary_coord(0.0..x_max, 0.0..100.0);

        chart.plotting_area().fill(&BACKGROUND)?;

        let date_label = |x: &f64| format_display_date(date_from_offset(start, *x));
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(6)
            .x_label_formatter(&date_label)
            .y_labels(4)
            .y_desc("New daily cases")
            .axis_style(RGBColor(60, 60, 60))
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Vaccinated once (%)")
            .draw()?;

        chart.draw_series(LineSeries::new(offsets(start, cases), &BLUE))?;
        chart.draw_secondary_series(LineSeries::new(offsets(start, vaccinated), &GREEN))?;

        let handle = day_offset(start, self.cursor.handle());
        chart.draw_series(LineSeries::new(
            [(handle, 0.0), (handle, y_max)],
            RED.stroke_width(2),
        ))?;
        chart.draw_series(std::iter::once(Text::new(
            format_display_date(self.cursor.handle()),
            (handle, y_max * 0.95),
            ("sans-serif", 14).into_font().color(&RED),
        )))?;

        Ok(())
    }
}

impl<'a> Chart<Message> for TimelineChart<'a> {
    type State = TimelineDragState;

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, builder: ChartBuilder<DB>) {
        if let Err(e) = self.draw(builder) {
            log::warn!("Failed to draw timeline: {}", e);
        }
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (Status, Option<Message>) {
        let Event::Mouse(event) = event else {
            return (Status::Ignored, None);
        };
        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let fx = cursor
                    .position_over(bounds)
                    .and_then(|position| Self::plot_fraction(bounds, position));
                match fx {
                    Some(fx) => {
                        state.dragging = true;
                        (Status::Captured, Some(Message::TimelineDragged(fx)))
                    }
                    None => (Status::Ignored, None),
                }
            }
            // Keep tracking outside the bounds; the cursor clamps.
            mouse::Event::CursorMoved { position } if state.dragging => {
                match Self::plot_fraction(bounds, position) {
                    Some(fx) => (Status::Captured, Some(Message::TimelineDragged(fx))),
                    None => (Status::Ignored, None),
                }
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) if state.dragging => {
                state.dragging = false;
                (Status::Captured, None)
            }
            _ => (Status::Ignored, None),
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.dragging {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

// Hover info card

pub struct InfoCardChart<'a> {
    pub card: &'a InfoCard,
    /// 0 is fully faded out
    pub alpha: f64,
}

impl<'a> InfoCardChart<'a> {
    fn draw<DB: DrawingBackend>(&self, mut builder: ChartBuilder<DB>) -> DrawResult<DB> {
        let (start, end) = self.card.window;
        let alpha = self.alpha.clamp(0.0, 1.0);

        let mut chart = builder
            .margin(8)
            .caption(&self.card.title, ("sans-serif", 16).into_font().color(&WHITE.mix(alpha)))
            .x_label_area_size(0)
            .y_label_area_size(0)
            .build_cartesian_2d(0.0..day_offset(start, end).max(1.0), 0.0..1.0)?;

        chart.plotting_area().fill(&RGBColor(0, 0, 0).mix(0.7 * alpha))?;

        for (i, series) in self.card.series.iter().enumerate() {
            let color = series.metric.color().mix(alpha);
            // Each series is scaled to its own y range.
            let scaled = |p: &Point| (day_offset(start, p.date), p.value / series.y_max);
            chart.draw_series(LineSeries::new(series.points.points().iter().map(&scaled), &color))?;

            chart.draw_series(std::iter::once(Text::new(
                series.metric.label(),
                (0.5, 0.95 - 0.1 * i as f64),
                ("sans-serif", 13).into_font().color(&color),
            )))?;

            if let Some(callout) = &series.callout {
                let (x, y) = scaled(&callout.at);
                chart.draw_series(std::iter::once(Text::new(
                    callout.text.clone(),
                    (x, y),
                    ("sans-serif", 13).into_font().color(&color),
                )))?;
            }
        }

        Ok(())
    }
}

impl<'a> Chart<Message> for InfoCardChart<'a> {
    type State = ();

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, builder: ChartBuilder<DB>) {
        if let Err(e) = self.draw(builder) {
            log::warn!("Failed to draw info card for {}: {}", self.card.country_code, e);
        }
    }
}

// Country trend panels

pub struct TrendChart<'a> {
    pub panel: &'a TrendPanel,
    pub x_range: (NaiveDate, NaiveDate),
    pub show_dates: bool,
}

impl<'a> TrendChart<'a> {
    fn draw<DB: DrawingBackend>(&self, mut builder: ChartBuilder<DB>) -> DrawResult<DB> {
        let (start, end) = self.x_range;
        let x_max = day_offset(start, end);
        let (y_min, y_max) = self.panel.y_range;

        let mut chart = builder
            .margin(8)
            .caption(self.panel.title, ("sans-serif", 15))
            .x_label_area_size(if self.show_dates { 24 } else { 0 })
            .y_label_area_size(80)
            .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

        chart.plotting_area().fill(&BACKGROUND)?;

        let date_label = |x: &f64| format_display_date(date_from_offset(start, *x));
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .y_labels(4)
            .y_desc(self.panel.axis_title)
            .axis_style(RGBColor(60, 60, 60))
            .draw()?;

        if let Some(average) = &self.panel.global_average {
            // Global average, faded
            chart.draw_series(LineSeries::new(
                offsets(start, average.points()).filter(|(x, _)| *x >= 0.0 && *x <= x_max),
                &BLUE.mix(100.0 / 255.0),
            ))?;
        }
        let points = self.panel.series.range(start, end);
        chart.draw_series(LineSeries::new(offsets(start, points), &BLUE))?;

        if let Some(label) = &self.panel.latest_label {
            chart.draw_series(std::iter::once(Text::new(
                label.clone(),
                (x_max * 0.01, y_max * 0.9),
                ("sans-serif", 13).into_font(),
            )))?;
        }

        Ok(())
    }
}

impl<'a> Chart<Message> for TrendChart<'a> {
    type State = ();

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, builder: ChartBuilder<DB>) {
        if let Err(e) = self.draw(builder) {
            log::warn!("Failed to draw trend panel '{}': {}", self.panel.title, e);
        }
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (Status, Option<Message>) {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                match local_fraction(bounds, cursor) {
                    Some(at) => (Status::Captured, Some(Message::TrendPressed(at))),
                    None => (Status::Ignored, None),
                }
            }
            _ => (Status::Ignored, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rectangle {
        Rectangle {
            x: 100.0,
            y: 50.0,
            width: 400.0,
            height: 200.0,
        }
    }

    #[test]
    fn test_local_fraction_is_y_up_and_relative_to_bounds() {
        let cursor = Cursor::Available(iced::Point::new(200.0, 100.0));
        let at = local_fraction(bounds(), cursor).unwrap();
        assert!((at.x - 0.25).abs() < 1e-6);
        assert!((at.y - 0.75).abs() < 1e-6);

        let outside = Cursor::Available(iced::Point::new(10.0, 10.0));
        assert!(local_fraction(bounds(), outside).is_none());
        assert!(local_fraction(bounds(), Cursor::Unavailable).is_none());
    }

    #[test]
    fn test_timeline_fraction_excludes_label_areas() {
        // Plot area spans x = 100 + 10 + 60 .. 100 + 400 - 10 - 40
        let left = iced::Point::new(170.0, 100.0);
        let right = iced::Point::new(450.0, 100.0);
        assert!(TimelineChart::plot_fraction(bounds(), left).unwrap().abs() < 1e-6);
        assert!((TimelineChart::plot_fraction(bounds(), right).unwrap() - 1.0).abs() < 1e-6);
        // Dragging past the plot edge is left for the cursor to clamp.
        let beyond = iced::Point::new(730.0, 100.0);
        assert!((TimelineChart::plot_fraction(bounds(), beyond).unwrap() - 2.0).abs() < 1e-6);
    }
}
