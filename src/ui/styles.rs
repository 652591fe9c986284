//! # UI Styling Module
//!
//! Centralized styling utilities for consistent UI appearance across components.

use iced::widget::button;
use iced::{Background, Border, Color};

fn solid(background: Color, border: Color, width: f32) -> button::Style {
    button::Style {
        background: Some(Background::Color(background)),
        text_color: Color::WHITE,
        border: Border {
            color: border,
            width,
            radius: 4.0.into(),
        },
        ..Default::default()
    }
}

/// Style for the relative/actual toggle; teal while relative values are shown
pub fn toggle_button_style(
    show_relative: bool,
) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme: &iced::Theme, status: button::Status| match (status, show_relative) {
        (button::Status::Active, true) => {
            solid(Color::from_rgb(0.2, 0.6, 0.7), Color::from_rgb(0.3, 0.7, 0.8), 2.0)
        }
        (button::Status::Active, false) => {
            solid(Color::from_rgb(0.4, 0.4, 0.4), Color::from_rgb(0.5, 0.5, 0.5), 1.0)
        }
        (button::Status::Hovered, true) => {
            solid(Color::from_rgb(0.3, 0.7, 0.8), Color::from_rgb(0.4, 0.8, 0.9), 2.0)
        }
        (button::Status::Hovered, false) => {
            solid(Color::from_rgb(0.5, 0.5, 0.5), Color::from_rgb(0.6, 0.6, 0.6), 1.0)
        }
        (button::Status::Pressed, true) => {
            solid(Color::from_rgb(0.15, 0.5, 0.6), Color::from_rgb(0.2, 0.6, 0.7), 2.0)
        }
        (button::Status::Pressed, false) => {
            solid(Color::from_rgb(0.35, 0.35, 0.35), Color::from_rgb(0.45, 0.45, 0.45), 1.0)
        }
        (button::Status::Disabled, _) => button::Style {
            text_color: Color::from_rgb(0.6, 0.6, 0.6),
            ..solid(Color::from_rgb(0.3, 0.3, 0.3), Color::from_rgb(0.4, 0.4, 0.4), 1.0)
        },
    }
}

/// Style for navigation actions (zoom out, retry)
pub fn action_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => {
            solid(Color::from_rgb(0.2, 0.7, 0.2), Color::from_rgb(0.3, 0.8, 0.3), 1.0)
        }
        button::Status::Hovered => {
            solid(Color::from_rgb(0.3, 0.8, 0.3), Color::from_rgb(0.4, 0.9, 0.4), 1.0)
        }
        button::Status::Pressed => {
            solid(Color::from_rgb(0.15, 0.6, 0.15), Color::from_rgb(0.2, 0.7, 0.2), 1.0)
        }
        _ => button::primary(theme, status),
    }
}
