// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod aggregate;
mod app;
mod charts;
mod clicks;
mod clock;
mod config;
mod cursor;
mod dataset;
mod error;
mod frame_cache;
mod info_card;
mod lut;
mod navigation;
mod proximity;
mod resolver;
mod scope;
mod session;
mod timeseries;
mod trends;
mod ui;
mod visualization;

use app::CovidDashboard;
use config::Config;
use iced::Theme;

fn main() -> iced::Result {
    // On Windows, force wgpu to use Vulkan backend instead of DirectX 12
    // This prevents "INVALID_SUBRESOURCE_STATE" errors with D3D12 resource state transitions
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    });
    log::info!("Reading datasets from {}", config.data_dir.display());

    iced::application(CovidDashboard::title, CovidDashboard::update, CovidDashboard::view)
        .subscription(CovidDashboard::subscription)
        .theme(|_| Theme::Light)
        .window_size((1200.0, 900.0))
        .run_with(move || CovidDashboard::new(config))
}
