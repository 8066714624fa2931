use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::images::{Instrument, resolve_figure};
use crate::data::loader::TableKind;
use crate::state::{AppState, FigureSlot};
use crate::ui::table::parameter_table;

// ---------------------------------------------------------------------------
// Burst Viewer page
// ---------------------------------------------------------------------------

pub fn burst_page(ui: &mut Ui, state: &mut AppState) {
    ui.label("Enter GRB Name (e.g., GRB210112A):");
    ui.horizontal(|ui: &mut Ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut state.search_input)
                .hint_text("GRB210112A")
                .desired_width(240.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submitted || ui.button("Search").clicked() {
            state.search();
        }
    });
    ui.add_space(8.0);

    let Some(record) = state.burst.clone() else {
        info(ui, "Enter a GRB name to display the results.");
        return;
    };

    if record.is_empty() {
        warning(ui, &format!("No data found for '{}'.", record.name));
        return;
    }

    ui.heading(&record.name);
    ui.add_space(4.0);

    let dataset_dir = state.dataset().map(|d| d.path.clone());

    egui::SidePanel::right("burst_tables")
        .resizable(true)
        .default_width(ui.available_width() / 3.0)
        .show_inside(ui, |ui: &mut Ui| {
            ui.heading("Table Fit Values");
            egui::ScrollArea::vertical()
                .id_salt("fit_values")
                .show(ui, |ui: &mut Ui| {
                    for kind in TableKind::ALL {
                        if let Some(matched) = record.get(kind) {
                            parameter_table(ui, matched);
                            ui.add_space(8.0);
                        }
                    }
                });
        });

    egui::CentralPanel::default().show_inside(ui, |ui: &mut Ui| {
        egui::ScrollArea::vertical()
            .id_salt("fit_plots")
            .show(ui, |ui: &mut Ui| {
                for instrument in Instrument::ALL {
                    ui.heading(format!("{} Plot", instrument.display_name()));
                    let path = dataset_dir
                        .as_deref()
                        .and_then(|dir| resolve_figure(dir, instrument, &record.name));
                    match path {
                        Some(path) => match state.figures.get(ui.ctx(), &path) {
                            FigureSlot::Loaded(texture) => {
                                ui.add(
                                    egui::Image::from_texture(
                                        egui::load::SizedTexture::from_handle(&texture),
                                    )
                                    .max_width(ui.available_width())
                                    .maintain_aspect_ratio(true),
                                );
                            }
                            FigureSlot::Failed(msg) => error(ui, &msg),
                        },
                        None => error(
                            ui,
                            &format!(
                                "{} fit not available for this burst.",
                                instrument.display_name()
                            ),
                        ),
                    }
                    ui.add_space(8.0);
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Message boxes
// ---------------------------------------------------------------------------

fn message(ui: &mut Ui, text: &str, fg: Color32, bg: Color32) {
    egui::Frame::group(ui.style())
        .fill(bg)
        .stroke(egui::Stroke::NONE)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(text).color(fg));
        });
}

pub fn info(ui: &mut Ui, text: &str) {
    message(ui, text, Color32::from_rgb(199, 235, 255), Color32::from_rgb(23, 45, 67));
}

pub fn warning(ui: &mut Ui, text: &str) {
    message(ui, text, Color32::from_rgb(255, 255, 194), Color32::from_rgb(62, 59, 22));
}

pub fn error(ui: &mut Ui, text: &str) {
    message(ui, text, Color32::from_rgb(255, 222, 222), Color32::from_rgb(62, 22, 22));
}
