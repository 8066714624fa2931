use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::lookup::TableMatch;
use crate::data::model::{CellValue, Table};

const ROW_HEIGHT: f32 = 18.0;

fn cell_text(value: &CellValue) -> RichText {
    if value.is_null() {
        return RichText::new("–").color(Color32::DARK_GRAY);
    }
    let text = RichText::new(value.to_string());
    if value.as_f64().is_some() {
        text.monospace()
    } else {
        text
    }
}

/// Fit values of one burst: a row per parameter, a column per matched entry.
pub fn parameter_table(ui: &mut Ui, matched: &TableMatch) {
    ui.strong(matched.kind.display_name());
    if matched.is_empty() {
        ui.label(
            RichText::new(format!(
                "No {} entries for this burst.",
                matched.kind.file_stem()
            ))
            .weak(),
        );
        return;
    }

    let params = matched.parameters();
    let n_values = matched.rows.len();

    ui.push_id(matched.kind.file_stem(), |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto().at_least(90.0))
            .columns(Column::auto().at_least(70.0), n_values)
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Parameter");
                });
                for i in 0..n_values {
                    header.col(|ui: &mut Ui| {
                        if n_values == 1 {
                            ui.strong("Value");
                        } else {
                            ui.strong(format!("#{}", i + 1));
                        }
                    });
                }
            })
            .body(|mut body| {
                for (name, values) in &params {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(*name);
                        });
                        for v in values {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell_text(v));
                            });
                        }
                    });
                }
            });
    });
}

/// Scrollable view of a whole table.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    if table.columns.is_empty() {
        ui.label("Table is empty.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(400.0)
            .columns(Column::auto().at_least(60.0), table.columns.len())
            .header(ROW_HEIGHT, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let Some(cells) = table.rows.get(row.index()) else {
                        return;
                    };
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(cell));
                        });
                    }
                });
            });
    });
}
