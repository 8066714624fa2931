mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::GrbViewerApp;
use clap::Parser;
use config::Args;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{args:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GRB Fit Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(GrbViewerApp::new(cc, &args)))),
    )
}
