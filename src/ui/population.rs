use eframe::egui::{self, RichText, Ui};

use crate::color::{ColorScale, MISSING_COLOR};
use crate::data::population::scatter_points;
use crate::state::AppState;
use crate::ui::burst::info;
use crate::ui::plot::{COLOR_BINS, population_plot};
use crate::ui::table::data_table;

const NONE_LABEL: &str = "None";

// ---------------------------------------------------------------------------
// Population Results page
// ---------------------------------------------------------------------------

pub fn population_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Population Statistics");
    ui.label(format!(
        "Showing results for all {} bursts.",
        state.afterglow().len()
    ));
    ui.add_space(4.0);

    if state.numeric_columns.is_empty() {
        info(ui, "The afterglow table has no numeric columns to plot.");
        return;
    }

    let columns = state.numeric_columns.clone();
    let selection = &mut state.settings.population;
    ui.columns(3, |cols| {
        axis_selector(&mut cols[0], "x_axis", "X-Axis Parameter", &columns, &mut selection.x, false);
        axis_selector(&mut cols[1], "y_axis", "Y-Axis Parameter", &columns, &mut selection.y, false);
        axis_selector(&mut cols[2], "color_by", "Color By (Optional)", &columns, &mut selection.color, true);
    });

    let selection = state.settings.population.clone();
    let data = scatter_points(state.afterglow(), &selection);
    let scale = selection
        .color
        .as_ref()
        .and_then(|_| data.color_range())
        .map(|(lo, hi)| ColorScale::new(lo, hi, COLOR_BINS));

    ui.add_space(4.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(selection.title());
    });
    if data.skipped > 0 {
        ui.label(
            RichText::new(format!(
                "{} burst(s) without positive finite values are not shown on log axes.",
                data.skipped
            ))
            .weak(),
        );
    }
    if let (Some(scale), Some(col)) = (&scale, &selection.color) {
        color_legend(ui, col, scale);
    }

    let plot_height = (ui.available_height() - 40.0).max(240.0);
    let clicked = ui
        .allocate_ui(egui::vec2(ui.available_width(), plot_height), |ui: &mut Ui| {
            population_plot(ui, &data, &selection, scale.as_ref())
        })
        .inner;
    if let Some(name) = clicked {
        log::info!("Opening {name} from population plot");
        state.show_burst(&name);
        return;
    }

    egui::CollapsingHeader::new("View Full Data Table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            data_table(ui, "afterglow_full", state.afterglow());
        });
}

fn axis_selector(
    ui: &mut Ui,
    id: &str,
    label: &str,
    columns: &[String],
    current: &mut Option<String>,
    optional: bool,
) {
    ui.label(label);
    let text = current.clone().unwrap_or_else(|| NONE_LABEL.to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if optional {
                ui.selectable_value(current, None, NONE_LABEL);
            }
            for col in columns {
                ui.selectable_value(current, Some(col.clone()), col);
            }
        });
}

/// Horizontal colour bar with min / max labels.
fn color_legend(ui: &mut Ui, column: &str, scale: &ColorScale) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{column}:"));
        ui.label(RichText::new(format!("{:.3e}", scale.min)).small());
        ui.spacing_mut().item_spacing.x = 0.0;
        for b in 0..scale.n_bins() {
            ui.label(RichText::new("█").color(scale.bin_color(b)))
                .on_hover_text(format!("≥ {:.3e}", scale.bin_start(b)));
        }
        ui.spacing_mut().item_spacing.x = 6.0;
        ui.label(RichText::new(format!("{:.3e}", scale.max)).small());
        ui.label(RichText::new("█ no value").color(MISSING_COLOR).small());
    });
}
