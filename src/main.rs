mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyEchemApp;
use eframe::egui;
use rusty_echem::config::FigureConfig;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: JSON figure config.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match FigureConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring config {}: {e:#}", path.display());
                FigureConfig::default()
            }
        },
        None => FigureConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Echem – Figure Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyEchemApp::new(config)))),
    )
}
