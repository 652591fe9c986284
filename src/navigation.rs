//! # Navigation State Machine Module
//!
//! Owns the single active view and decides every transition between views.
//!
//! ## States
//! - `Map(World)`
//! - `Map(Continent(c))` for the five drill-down continents
//! - `Country { code, parent, show_relative }`
//!
//! ## Transitions
//! - World, single click inside a continent boundary box: Continent
//! - World/Continent, single click outside every box with a last pointed
//!   country: Country
//! - Continent, double click or zoom out control: World
//! - Country, double click on a trend panel or zoom out control: parent view
//! - Country, relative/actual toggle: same Country with the other unit mode
//!
//! Drill-ins within `DRILL_IN_COOLDOWN` and zoom-outs within `ZOOM_OUT_COOLDOWN`
//! of the previous transition are dropped silently.
//!
//! ## Resource Discipline
//! Each view owns a `ViewScope`. On every transition the outgoing scope is
//! disposed before the incoming view is activated, and the click detector is
//! replaced so a deferred click from the old view can never fire into the new one.

use crate::clicks::{Click, ClickDetector};
use crate::dataset::CountryInfo;
use crate::scope::{Listener, TimerKind, ViewScope, TIMER_PERIOD};
use crate::visualization::{FracPoint, FracRect, GeoExtent};
use std::fmt;
use std::time::{Duration, Instant};

pub const DRILL_IN_COOLDOWN: Duration = Duration::from_millis(750);
pub const ZOOM_OUT_COOLDOWN: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
}

impl Continent {
    pub fn display_name(self) -> &'static str {
        match self {
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Europe => "Europe",
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
        }
    }

    pub fn extent(self) -> GeoExtent {
        match self {
            Continent::NorthAmerica => GeoExtent { lon: (-170.0, -50.0), lat: (5.0, 75.0) },
            Continent::SouthAmerica => GeoExtent { lon: (-90.0, -30.0), lat: (-56.0, 15.0) },
            Continent::Europe => GeoExtent { lon: (-25.0, 45.0), lat: (34.0, 72.0) },
            Continent::Africa => GeoExtent { lon: (-20.0, 55.0), lat: (-36.0, 38.0) },
            Continent::Asia => GeoExtent { lon: (25.0, 150.0), lat: (-11.0, 56.0) },
        }
    }

    /// Continent membership from the country's region and subregion
    pub fn of(info: &CountryInfo) -> Option<Continent> {
        match (info.region.as_deref()?, info.subregion.as_deref()) {
            ("Europe", _) => Some(Continent::Europe),
            ("Africa", _) => Some(Continent::Africa),
            ("Asia", _) => Some(Continent::Asia),
            ("Americas", Some("South America")) => Some(Continent::SouthAmerica),
            (
                "Americas",
                Some("North America" | "Northern America" | "Central America" | "Caribbean"),
            ) => Some(Continent::NorthAmerica),
            _ => None,
        }
    }
}

/// A map view: the world or one continent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapView {
    World,
    Continent(Continent),
}

impl MapView {
    pub fn extent(self) -> GeoExtent {
        match self {
            MapView::World => GeoExtent { lon: (-180.0, 180.0), lat: (-60.0, 85.0) },
            MapView::Continent(c) => c.extent(),
        }
    }

    /// Whether a country is a region of this map
    pub fn contains(self, info: &CountryInfo) -> bool {
        match self {
            MapView::World => true,
            MapView::Continent(c) => Continent::of(info) == Some(c),
        }
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapView::World => write!(f, "World"),
            MapView::Continent(c) => write!(f, "{}", c.display_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryFocus {
    pub code: String,
    pub parent: MapView,
    pub show_relative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Map(MapView),
    Country(CountryFocus),
}

impl View {
    fn label(&self) -> String {
        match self {
            View::Map(map) => map.to_string(),
            View::Country(focus) => format!("Country {}", focus.code),
        }
    }
}

/// Boundary box on the World map that drills into a continent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillDownRoute {
    pub target: Continent,
    pub boundary: FracRect,
}

/// Boundary boxes of the World map in fractional chart coordinates
pub fn world_routes() -> Vec<DrillDownRoute> {
    vec![
        DrillDownRoute {
            target: Continent::NorthAmerica,
            boundary: FracRect::new(0.04, 0.52, 0.44, 0.93),
        },
        DrillDownRoute {
            target: Continent::SouthAmerica,
            boundary: FracRect::new(0.16, 0.14, 0.45, 0.50),
        },
        DrillDownRoute {
            target: Continent::Europe,
            boundary: FracRect::new(0.45, 0.64, 0.60, 0.93),
        },
        DrillDownRoute {
            target: Continent::Africa,
            boundary: FracRect::new(0.46, 0.15, 0.63, 0.64),
        },
        DrillDownRoute {
            target: Continent::Asia,
            boundary: FracRect::new(0.59, 0.40, 0.95, 0.91),
        },
    ]
}

/// Which surface received a press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Map,
    TrendPanel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: View,
    pub to: View,
}

#[derive(Debug)]
pub struct Navigator {
    view: View,
    scope: ViewScope,
    clicks: ClickDetector,
    routes: Vec<DrillDownRoute>,
    last_change: Instant,
    show_relative: bool,
}

impl Navigator {
    /// Start on the World map
    pub fn new(show_relative: bool, now: Instant) -> Self {
        let view = View::Map(MapView::World);
        let scope = Self::activate(&view, now);
        Self {
            view,
            scope,
            clicks: ClickDetector::new(),
            routes: world_routes(),
            last_change: now,
            show_relative,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn show_relative(&self) -> bool {
        self.show_relative
    }

    pub fn live_timers(&self, kind: TimerKind) -> usize {
        self.scope.live_timers(kind)
    }

    pub fn listens(&self, listener: Listener) -> bool {
        self.scope.listens(listener)
    }

    pub fn due_timers(&mut self, now: Instant) -> Vec<TimerKind> {
        self.scope.due(now)
    }

    /// Continent whose boundary box contains `at`, if the active view has routes
    pub fn route_at(&self, at: FracPoint) -> Option<Continent> {
        if self.view != View::Map(MapView::World) {
            return None;
        }
        self.routes
            .iter()
            .find(|route| route.boundary.contains(at))
            .map(|route| route.target)
    }

    /// Raw press on a chart background. Double-clicks act immediately;
    /// single clicks wait for `poll_clicks`.
    pub fn press(
        &mut self,
        target: PressTarget,
        at: FracPoint,
        now: Instant,
    ) -> Option<Transition> {
        let listener = match target {
            PressTarget::Map => Listener::MapClick,
            PressTarget::TrendPanel => Listener::TrendClick,
        };
        if !self.scope.listens(listener) {
            return None;
        }
        match self.clicks.press(now, at)? {
            Click::Double(_) => self.zoom_out(now),
            Click::Single(_) => None,
        }
    }

    /// Resolve a deferred single click. `last_pointed` is read now, at
    /// resolution time, not at the time of the press.
    pub fn poll_clicks(&mut self, now: Instant, last_pointed: Option<&str>) -> Option<Transition> {
        match self.clicks.poll(now)? {
            Click::Single(at) => match self.view {
                View::Map(_) => self.drill_down(at, last_pointed, now),
                View::Country(_) => None,
            },
            Click::Double(_) => self.zoom_out(now),
        }
    }

    pub fn zoom_out_pressed(&mut self, now: Instant) -> Option<Transition> {
        if !self.scope.listens(Listener::ZoomOutButton) {
            return None;
        }
        self.zoom_out(now)
    }

    /// Rebuild the country view with the other unit mode.
    pub fn toggle_relative_values(&mut self, now: Instant) -> Option<Transition> {
        if !self.scope.listens(Listener::RelativeToggle) {
            return None;
        }
        let View::Country(focus) = &self.view else {
            return None;
        };
        let show_relative = !focus.show_relative;
        let next = View::Country(CountryFocus {
            show_relative,
            ..focus.clone()
        });
        self.show_relative = show_relative;
        Some(self.transition(next, now))
    }

    fn drill_down(
        &mut self,
        at: FracPoint,
        last_pointed: Option<&str>,
        now: Instant,
    ) -> Option<Transition> {
        let View::Map(map) = self.view else {
            return None;
        };
        if now.saturating_duration_since(self.last_change) < DRILL_IN_COOLDOWN {
            log::debug!("Ignoring drill-down within cooldown");
            return None;
        }
        if let Some(continent) = self.route_at(at) {
            return Some(self.transition(View::Map(MapView::Continent(continent)), now));
        }
        let code = last_pointed?;
        let next = View::Country(CountryFocus {
            code: code.to_string(),
            parent: map,
            show_relative: self.show_relative,
        });
        Some(self.transition(next, now))
    }

    fn zoom_out(&mut self, now: Instant) -> Option<Transition> {
        let parent = match &self.view {
            View::Map(MapView::World) => return None,
            View::Map(MapView::Continent(_)) => MapView::World,
            View::Country(focus) => focus.parent,
        };
        if now.saturating_duration_since(self.last_change) < ZOOM_OUT_COOLDOWN {
            log::debug!("Ignoring zoom out within cooldown");
            return None;
        }
        Some(self.transition(View::Map(parent), now))
    }

    fn transition(&mut self, next: View, now: Instant) -> Transition {
        log::debug!("View change: {} -> {}", self.view.label(), next.label());
        // Outgoing timers and listeners die before the next view registers any.
        self.scope.dispose();
        self.clicks = ClickDetector::new();
        self.scope = Self::activate(&next, now);
        self.last_change = now;
        let from = std::mem::replace(&mut self.view, next);
        Transition {
            from,
            to: self.view.clone(),
        }
    }

    fn activate(view: &View, now: Instant) -> ViewScope {
        let mut scope = ViewScope::new(view.label());
        match view {
            View::Map(map) => {
                scope.every(TimerKind::CursorApply, TIMER_PERIOD, now);
                scope.every(TimerKind::HoverRefresh, TIMER_PERIOD, now);
                scope.listen(Listener::MapClick);
                if *map != MapView::World {
                    scope.listen(Listener::ZoomOutButton);
                }
            }
            View::Country(_) => {
                scope.listen(Listener::TrendClick);
                scope.listen(Listener::ZoomOutButton);
                scope.listen(Listener::RelativeToggle);
            }
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    const EUROPE: FracPoint = FracPoint { x: 0.5, y: 0.7 };
    const OCEAN: FracPoint = FracPoint { x: 0.99, y: 0.02 };

    fn click(
        nav: &mut Navigator,
        clock: &ManualClock,
        at: FracPoint,
        pointed: Option<&str>,
    ) -> Option<Transition> {
        assert!(nav.press(PressTarget::Map, at, clock.now()).is_none());
        nav.poll_clicks(clock.advance_ms(200), pointed)
    }

    fn info(region: Option<&str>, subregion: Option<&str>) -> CountryInfo {
        CountryInfo {
            code: "XXX".into(),
            name: "X".into(),
            latitude: 0.0,
            longitude: 0.0,
            region: region.map(String::from),
            subregion: subregion.map(String::from),
        }
    }

    #[test]
    fn test_boundary_routing_prefers_containing_box() {
        let clock = ManualClock::new();
        let nav = Navigator::new(true, clock.now());
        assert_eq!(nav.route_at(EUROPE), Some(Continent::Europe));
        assert_eq!(nav.route_at(FracPoint { x: 0.2, y: 0.7 }), Some(Continent::NorthAmerica));
        assert_eq!(nav.route_at(OCEAN), None);
    }

    #[test]
    fn test_single_click_drills_into_continent() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        clock.advance_ms(1000);

        let transition = click(&mut nav, &clock, EUROPE, Some("FIN")).unwrap();
        assert_eq!(transition.from, View::Map(MapView::World));
        assert_eq!(*nav.view(), View::Map(MapView::Continent(Continent::Europe)));
        // Continents have no boxes of their own.
        assert_eq!(nav.route_at(EUROPE), None);
    }

    #[test]
    fn test_click_outside_boxes_drills_into_last_pointed_country() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(false, clock.now());
        clock.advance_ms(1000);

        assert!(click(&mut nav, &clock, OCEAN, None).is_none());
        assert_eq!(*nav.view(), View::Map(MapView::World));

        clock.advance_ms(1000);
        click(&mut nav, &clock, OCEAN, Some("FIN")).unwrap();
        assert_eq!(
            *nav.view(),
            View::Country(CountryFocus {
                code: "FIN".into(),
                parent: MapView::World,
                show_relative: false,
            })
        );
    }

    #[test]
    fn test_drill_in_cooldown() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        clock.advance_ms(1000);
        click(&mut nav, &clock, EUROPE, None).unwrap();

        // Resolves 500 ms after entering Europe.
        clock.advance_ms(300);
        assert!(click(&mut nav, &clock, OCEAN, Some("FIN")).is_none());
        assert_eq!(*nav.view(), View::Map(MapView::Continent(Continent::Europe)));

        clock.advance_ms(500);
        click(&mut nav, &clock, OCEAN, Some("FIN")).unwrap();
        let europe = MapView::Continent(Continent::Europe);
        assert!(matches!(nav.view(), View::Country(focus) if focus.parent == europe));
    }

    #[test]
    fn test_double_click_zooms_out_after_cooldown() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        clock.advance_ms(1000);
        click(&mut nav, &clock, EUROPE, None).unwrap();

        // Too soon after entering Europe.
        clock.advance_ms(1000);
        nav.press(PressTarget::Map, OCEAN, clock.now());
        assert!(nav.press(PressTarget::Map, OCEAN, clock.advance_ms(100)).is_none());
        assert!(nav.poll_clicks(clock.advance_ms(300), Some("FIN")).is_none());
        assert_eq!(*nav.view(), View::Map(MapView::Continent(Continent::Europe)));

        clock.advance_ms(1000);
        nav.press(PressTarget::Map, EUROPE, clock.now());
        let transition = nav.press(PressTarget::Map, EUROPE, clock.advance_ms(100)).unwrap();
        assert_eq!(transition.to, View::Map(MapView::World));
        // The suppressed single click does not drill back in.
        assert!(nav.poll_clicks(clock.advance_ms(1000), Some("FIN")).is_none());
        assert_eq!(*nav.view(), View::Map(MapView::World));
    }

    #[test]
    fn test_double_click_on_world_does_nothing() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        clock.advance_ms(5000);
        nav.press(PressTarget::Map, EUROPE, clock.now());
        assert!(nav.press(PressTarget::Map, EUROPE, clock.advance_ms(50)).is_none());
        assert!(nav.zoom_out_pressed(clock.now()).is_none());
        assert_eq!(*nav.view(), View::Map(MapView::World));
    }

    #[test]
    fn test_country_returns_to_parent() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        clock.advance_ms(1000);
        click(&mut nav, &clock, FracPoint { x: 0.3, y: 0.3 }, None).unwrap();
        clock.advance_ms(1000);
        click(&mut nav, &clock, OCEAN, Some("BRA")).unwrap();
        assert!(matches!(nav.view(), View::Country(_)));

        // Single clicks on panels do nothing; map presses are not listened to.
        clock.advance_ms(3000);
        assert!(nav.press(PressTarget::Map, OCEAN, clock.now()).is_none());
        nav.press(PressTarget::TrendPanel, OCEAN, clock.advance_ms(1000));
        assert!(nav.poll_clicks(clock.advance_ms(300), Some("FIN")).is_none());

        let transition = nav.zoom_out_pressed(clock.now()).unwrap();
        assert_eq!(transition.to, View::Map(MapView::Continent(Continent::SouthAmerica)));
    }

    #[test]
    fn test_toggle_rebuilds_country_and_persists_mode() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        assert!(nav.toggle_relative_values(clock.now()).is_none());

        clock.advance_ms(1000);
        click(&mut nav, &clock, OCEAN, Some("FIN")).unwrap();
        let transition = nav.toggle_relative_values(clock.advance_ms(10)).unwrap();
        assert!(matches!(&transition.from, View::Country(f) if f.show_relative));
        assert!(matches!(&transition.to, View::Country(f) if !f.show_relative && f.code == "FIN"));
        assert!(!nav.show_relative());

        clock.advance_ms(2500);
        nav.zoom_out_pressed(clock.now()).unwrap();
        clock.advance_ms(1000);
        click(&mut nav, &clock, OCEAN, Some("SWE")).unwrap();
        assert!(matches!(nav.view(), View::Country(f) if !f.show_relative));
    }

    #[test]
    fn test_rapid_transitions_leave_one_timer_set() {
        let clock = ManualClock::new();
        let mut nav = Navigator::new(true, clock.now());
        for _ in 0..20 {
            clock.advance_ms(2100);
            click(&mut nav, &clock, EUROPE, None).unwrap();
            clock.advance_ms(2100);
            click(&mut nav, &clock, OCEAN, Some("FIN")).unwrap();
            clock.advance_ms(10);
            nav.toggle_relative_values(clock.now()).unwrap();
            assert_eq!(nav.live_timers(TimerKind::CursorApply), 0);
            clock.advance_ms(2100);
            nav.zoom_out_pressed(clock.now()).unwrap();
            assert_eq!(nav.live_timers(TimerKind::CursorApply), 1);
            assert_eq!(nav.live_timers(TimerKind::HoverRefresh), 1);
            clock.advance_ms(2100);
            nav.zoom_out_pressed(clock.now()).unwrap();
        }
        assert_eq!(*nav.view(), View::Map(MapView::World));
        assert_eq!(nav.live_timers(TimerKind::CursorApply), 1);
        assert_eq!(nav.live_timers(TimerKind::HoverRefresh), 1);
    }

    #[test]
    fn test_continent_membership() {
        assert_eq!(Continent::of(&info(Some("Europe"), None)), Some(Continent::Europe));
        assert_eq!(
            Continent::of(&info(Some("Americas"), Some("Caribbean"))),
            Some(Continent::NorthAmerica)
        );
        assert_eq!(
            Continent::of(&info(Some("Americas"), Some("South America"))),
            Some(Continent::SouthAmerica)
        );
        assert_eq!(Continent::of(&info(Some("Oceania"), None)), None);
        assert_eq!(Continent::of(&info(None, None)), None);
        assert!(MapView::World.contains(&info(None, None)));
        assert!(!MapView::Continent(Continent::Asia).contains(&info(Some("Europe"), None)));
    }
}
