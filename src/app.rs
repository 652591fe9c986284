use crate::charts::{InfoCardChart, MapChart, TimelineChart, TrendChart};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::navigation::{MapView, View};
use crate::session::{DashboardData, MapResources, Session, ViewResources};
use crate::trends::CountryPanels;
use crate::ui::styles;
use crate::visualization::{card_offset, format_display_date, FracPoint, CARD_SIZE};
use iced::widget::{button, column, container, row, stack, text, Space};
use iced::{Element, Length, Padding, Size, Subscription, Task};
use plotters_iced::ChartWidget;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK_PERIOD: Duration = Duration::from_millis(16);
/// Card opacity change per tick; a full fade takes about half a second.
const CARD_FADE_STEP: f64 = 1.0 / 30.0;

pub enum Phase {
    Loading,
    Failed(String),
    Ready(Box<Session>),
}

// Iced Application State
pub struct CovidDashboard {
    config: Config,
    phase: Phase,
    clock: SystemClock,
    card_alpha: f64,
    /// Map widget size as of the last pointer move
    map_size: Size,
}

#[derive(Debug, Clone)]
pub enum Message {
    DatasetLoaded(Result<Arc<DashboardData>, String>),
    RetryLoad,
    Tick(Instant),
    MapPointer(FracPoint, Size),
    MapPointerLeft,
    MapPressed(FracPoint),
    TrendPressed(FracPoint),
    TimelineDragged(f32),
    ZoomOut,
    ToggleRelativeValues,
}

async fn load_dashboard(config: Config) -> Result<Arc<DashboardData>, String> {
    DashboardData::load(config).await.map(Arc::new).map_err(|e| {
        log::error!("Failed to load datasets: {}", e);
        e.to_string()
    })
}

impl CovidDashboard {
    pub fn new(config: Config) -> (Self, Task<Message>) {
        let load = Task::perform(load_dashboard(config.clone()), Message::DatasetLoaded);
        (
            CovidDashboard {
                config,
                phase: Phase::Loading,
                clock: SystemClock,
                card_alpha: 0.0,
                map_size: Size::ZERO,
            },
            load,
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DatasetLoaded(Ok(data)) => {
                let session = Session::new(data, &self.config, self.clock.now());
                self.phase = Phase::Ready(Box::new(session));
                Task::none()
            }
            Message::DatasetLoaded(Err(e)) => {
                self.phase = Phase::Failed(e);
                Task::none()
            }
            Message::RetryLoad => {
                self.phase = Phase::Loading;
                Task::perform(load_dashboard(self.config.clone()), Message::DatasetLoaded)
            }
            message => {
                if let Phase::Ready(session) = &mut self.phase {
                    let now = self.clock.now();
                    match message {
                        Message::Tick(at) => {
                            if session.tick(at).is_some() {
                                self.card_alpha = 0.0;
                            }
                            self.fade_card();
                        }
                        Message::MapPointer(at, size) => {
                            self.map_size = size;
                            session.pointer_moved(at);
                        }
                        Message::MapPointerLeft => session.pointer_left(),
                        Message::MapPressed(at) => {
                            session.map_pressed(at, now);
                        }
                        Message::TrendPressed(at) => {
                            session.trend_pressed(at, now);
                        }
                        Message::TimelineDragged(fx) => {
                            session.drag_cursor(fx);
                        }
                        Message::ZoomOut => {
                            session.zoom_out_pressed(now);
                        }
                        Message::ToggleRelativeValues => {
                            session.toggle_relative_values(now);
                        }
                        Message::DatasetLoaded(_) | Message::RetryLoad => {}
                    }
                }
                Task::none()
            }
        }
    }

    fn fade_card(&mut self) {
        let Phase::Ready(session) = &self.phase else {
            return;
        };
        let target = match session.resources() {
            ViewResources::Map(map) if map.card_visible => 1.0,
            _ => 0.0,
        };
        if self.card_alpha < target {
            self.card_alpha = (self.card_alpha + CARD_FADE_STEP).min(target);
        } else {
            self.card_alpha = (self.card_alpha - CARD_FADE_STEP).max(target);
        }
    }

    pub fn title(&self) -> String {
        match &self.phase {
            Phase::Ready(session) => match session.view() {
                View::Map(map) => format!("CoVID Drill-down Dashboard - {}", map),
                View::Country(focus) => format!("CoVID Drill-down Dashboard - {}", focus.code),
            },
            _ => "CoVID Drill-down Dashboard".to_string(),
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        match self.phase {
            Phase::Ready(_) => iced::time::every(TICK_PERIOD).map(Message::Tick),
            _ => Subscription::none(),
        }
    }

    pub fn view(&'_ self) -> Element<'_, Message> {
        let content = match &self.phase {
            Phase::Loading => self.create_status_view("Loading datasets...", false),
            Phase::Failed(e) => self.create_status_view(e, true),
            Phase::Ready(session) => match session.resources() {
                ViewResources::Map(map) => self.create_map_view(session, map),
                ViewResources::Country(panels) => self.create_country_view(panels),
            },
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn create_status_view<'a>(&'a self, message: &'a str, retry: bool) -> Element<'a, Message> {
        let mut content = column![text(message).size(24)]
            .spacing(20)
            .align_x(iced::alignment::Horizontal::Center);
        if retry {
            content = content.push(
                button(text("Retry"))
                    .on_press(Message::RetryLoad)
                    .padding(10)
                    .style(styles::action_button_style()),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center(Length::Fill)
            .into()
    }

    fn create_tips(&self, drill_in: bool, zoom_out: bool) -> Element<'_, Message> {
        let mut tips = column![].spacing(2);
        if drill_in {
            tips = tips.push(text("Left click to drill down at mouse location").size(12));
        }
        if zoom_out {
            tips = tips.push(text("Double left click to zoom out").size(12));
            tips = tips.push(
                button(text("Zoom out").size(14))
                    .on_press(Message::ZoomOut)
                    .padding(6)
                    .style(styles::action_button_style()),
            );
        }
        tips.into()
    }

    fn create_map_view<'a>(
        &'a self,
        session: &'a Session,
        map: &'a MapResources,
    ) -> Element<'a, Message> {
        let title = text(format!(
            "CoVID vaccinations & new cases | {}",
            format_display_date(map.frame.date)
        ))
        .size(22);
        let header = row![
            title,
            Space::with_width(Length::Fill),
            self.create_tips(true, map.map != MapView::World)
        ]
        .spacing(20)
        .padding(10);

        let map_chart = ChartWidget::new(MapChart { resources: map })
            .width(Length::Fill)
            .height(Length::Fill);

        let map_layer: Element<'a, Message> = match &map.card {
            Some(card) if self.card_alpha > 0.0 => {
                let anchor = map.map.extent().to_fraction(card.anchor);
                let (left, top) = card_offset(anchor, self.map_size.width, self.map_size.height);
                let card_chart = ChartWidget::new(InfoCardChart {
                    card,
                    alpha: self.card_alpha,
                })
                .width(Length::Fixed(CARD_SIZE.0))
                .height(Length::Fixed(CARD_SIZE.1));
                let placed = container(card_chart).padding(Padding {
                    top,
                    right: 0.0,
                    bottom: 0.0,
                    left,
                });
                stack![map_chart, placed].into()
            }
            _ => map_chart.into(),
        };

        let timeline = ChartWidget::new(TimelineChart {
            data: session.data(),
            cursor: session.cursor(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        column![
            header,
            container(map_layer).height(Length::FillPortion(3)),
            container(timeline).height(Length::FillPortion(1))
        ]
        .spacing(10)
        .padding(10)
        .into()
    }

    fn create_country_view<'a>(&'a self, panels: &'a CountryPanels) -> Element<'a, Message> {
        let header = row![
            text(&panels.country_name).size(22),
            Space::with_width(Length::Fill),
            button(text(panels.toggle_label()).size(14))
                .on_press(Message::ToggleRelativeValues)
                .padding(6)
                .style(styles::toggle_button_style(panels.show_relative)),
            self.create_tips(false, true)
        ]
        .spacing(20)
        .padding(10);

        let last = panels.panels.len().saturating_sub(1);
        let charts = panels.panels.iter().enumerate().map(|(i, panel)| {
            ChartWidget::new(TrendChart {
                panel,
                x_range: panels.x_range,
                show_dates: i == last,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
        });

        column![header, column(charts).spacing(4)]
            .spacing(10)
            .padding(10)
            .into()
    }
}
