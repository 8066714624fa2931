use eframe::egui;

use crate::config::{Args, Page, Settings};
use crate::state::AppState;
use crate::ui::{burst, panels, population};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GrbViewerApp {
    pub state: AppState,
}

impl GrbViewerApp {
    /// Restore persisted settings, apply the command line and load the
    /// initial dataset.
    pub fn new(cc: &eframe::CreationContext<'_>, args: &Args) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let stored: Settings = cc
            .storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();
        let mut state = AppState::new(stored.merge_args(args));

        if let Some(grb) = &args.grb {
            state.show_burst(grb);
        }

        Self { state }
    }
}

impl eframe::App for GrbViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.settings.page {
            Page::BurstViewer => burst::burst_page(ui, &mut self.state),
            Page::Population => population::population_page(ui, &mut self.state),
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state.settings);
    }
}
