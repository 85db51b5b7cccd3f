mod app;
mod color;
mod state;
mod ui;

use app::TabstatApp;
use eframe::egui;
use tabstat::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Ignoring config: {e:#}");
            AppConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tabstat – Tabular Statistics",
        options,
        Box::new(|_cc| Ok(Box::new(TabstatApp::new(config)))),
    )
}
