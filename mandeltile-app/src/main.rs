mod app;
mod app_dir;
mod input;
mod preferences;
mod texture_sink;

use eframe::egui;
use tracing::{error, info};

use app::MandelTileApp;
use preferences::AppPreferences;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting MandelTile");

    let prefs = AppPreferences::load();

    if prefs.worker_threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(prefs.worker_threads)
            .thread_name(|i| format!("mandeltile-tile-{i}"))
            .build_global()
        {
            Ok(()) => info!(threads = prefs.worker_threads, "Configured tile worker pool"),
            Err(e) => error!("Failed to configure tile worker pool: {e}"),
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MandelTile")
            .with_inner_size([prefs.window_width, prefs.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "MandelTile",
        options,
        Box::new(move |_cc| Ok(Box::new(MandelTileApp::new(prefs)))),
    )
}
