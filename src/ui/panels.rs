use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation panel: dataset selector and page switch.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    if state.datasets.is_empty() {
        ui.label("No datasets found.");
        ui.label(
            RichText::new(state.results_dir().display().to_string())
                .small()
                .weak(),
        );
    } else {
        ui.strong("Select dataset");
        let current = state
            .dataset()
            .map(|d| d.label.clone())
            .unwrap_or_default();
        let mut clicked = None;
        egui::ComboBox::from_id_salt("dataset")
            .selected_text(&current)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                for (i, ds) in state.datasets.iter().enumerate() {
                    if ui
                        .selectable_label(state.selected == Some(i), &ds.label)
                        .on_hover_text(&ds.folder)
                        .clicked()
                    {
                        clicked = Some(i);
                    }
                }
            });
        if let Some(i) = clicked {
            if state.selected != Some(i) {
                state.select_dataset(i);
            }
        }
    }

    ui.separator();

    ui.strong("Go to");
    for page in Page::ALL {
        ui.radio_value(&mut state.settings.page, page, page.label());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open results folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{}: {} afterglow, {} flare, {} pulse rows",
                ds.folder,
                state.tables.afterglow.len(),
                state.tables.flares.len(),
                state.tables.pulses.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open results folder")
        .set_directory(state.results_dir())
        .pick_folder();

    if let Some(path) = folder {
        state.set_results_dir(path);
    }
}
