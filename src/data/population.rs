use serde::{Deserialize, Serialize};

use super::lookup::GRB_NAME_COLUMN;
use super::model::{CellValue, Table};

/// Columns whose non-null cells are all integers or floats, in table order.
///
/// A table without rows has no numeric columns: nothing types its cells, so
/// header-only files read as text. In a non-empty table an all-null column
/// counts as numeric.
pub fn numeric_columns(table: &Table) -> Vec<String> {
    if table.is_empty() {
        return Vec::new();
    }
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| table.column_values(*i).all(CellValue::is_numeric_compatible))
        .map(|(_, name)| name.clone())
        .collect()
}

/// Axis and colour choices of the population plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
}

impl PopulationSelection {
    /// First numeric column on x, the second (or the first again) on y.
    pub fn defaults(numeric: &[String]) -> Self {
        let y_idx = 1.min(numeric.len().saturating_sub(1));
        PopulationSelection {
            x: numeric.first().cloned(),
            y: numeric.get(y_idx).cloned(),
            color: None,
        }
    }

    /// Drop choices not present in `numeric`, falling back to defaults.
    pub fn validate(&mut self, numeric: &[String]) {
        let defaults = Self::defaults(numeric);
        let valid = |c: &Option<String>| c.as_ref().is_some_and(|c| numeric.contains(c));
        if !valid(&self.x) {
            self.x = defaults.x;
        }
        if !valid(&self.y) {
            self.y = defaults.y;
        }
        if self.color.is_some() && !valid(&self.color) {
            self.color = None;
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{} vs {}",
            self.y.as_deref().unwrap_or("?"),
            self.x.as_deref().unwrap_or("?")
        )
    }
}

/// One burst on the population plot, in data (not log) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub color: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterData {
    pub points: Vec<ScatterPoint>,
    /// Rows that cannot be drawn on log axes (missing, non-finite or <= 0).
    pub skipped: usize,
}

impl ScatterData {
    /// Min and max of the finite colour values.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.color)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn log_placeable(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite() && *v > 0.0)
}

/// Collect plottable points for the chosen axes.
pub fn scatter_points(table: &Table, selection: &PopulationSelection) -> ScatterData {
    let (Some(x_col), Some(y_col)) = (
        selection.x.as_deref().and_then(|c| table.column_index(c)),
        selection.y.as_deref().and_then(|c| table.column_index(c)),
    ) else {
        return ScatterData::default();
    };
    let color_col = selection.color.as_deref().and_then(|c| table.column_index(c));
    let name_col = table.column_index(GRB_NAME_COLUMN);

    let mut data = ScatterData::default();
    for (i, row) in table.rows.iter().enumerate() {
        let x = log_placeable(row.get(x_col).and_then(CellValue::as_f64));
        let y = log_placeable(row.get(y_col).and_then(CellValue::as_f64));
        let (Some(x), Some(y)) = (x, y) else {
            data.skipped += 1;
            continue;
        };
        let name = name_col
            .and_then(|c| row.get(c))
            .map(|v| v.to_string())
            .unwrap_or_else(|| format!("row {i}"));
        let color = color_col
            .and_then(|c| row.get(c))
            .and_then(CellValue::as_f64);
        data.points.push(ScatterPoint { name, x, y, color });
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn afterglow() -> Table {
        let mut t = Table::new(
            ["GRBname", "alpha_1", "t_break", "flux", "comment"]
                .map(String::from)
                .to_vec(),
        );
        t.push_row(vec![
            CellValue::Text("GRB1".into()),
            CellValue::Float(1.2),
            CellValue::Integer(300),
            CellValue::Float(1e-11),
            CellValue::Text("ok".into()),
        ]);
        t.push_row(vec![
            CellValue::Text("GRB2".into()),
            CellValue::Float(-0.5),
            CellValue::Integer(800),
            CellValue::Null,
            CellValue::Null,
        ]);
        t.push_row(vec![
            CellValue::Text("GRB3".into()),
            CellValue::Null,
            CellValue::Integer(50),
            CellValue::Float(3e-12),
            CellValue::Text("refit".into()),
        ]);
        t
    }

    #[test]
    fn numeric_columns_keep_order_and_skip_text() {
        assert_eq!(numeric_columns(&afterglow()), ["alpha_1", "t_break", "flux"]);
    }

    #[test]
    fn header_only_table_has_no_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afterglow.csv");
        std::fs::write(&path, "GRBname,alpha_1,comment\n").unwrap();
        let table = crate::data::loader::load_table(&path).unwrap();
        assert_eq!(table.columns.len(), 3);
        assert!(numeric_columns(&table).is_empty());
        assert_eq!(PopulationSelection::defaults(&numeric_columns(&table)), PopulationSelection::default());
    }

    #[test]
    fn all_null_column_counts_as_numeric() {
        let mut t = Table::new(vec!["GRBname".into(), "empty".into()]);
        t.push_row(vec![CellValue::Text("GRB1".into()), CellValue::Null]);
        assert_eq!(numeric_columns(&t), ["empty"]);
    }

    #[test]
    fn defaults_pick_first_two_columns() {
        let cols: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
        let sel = PopulationSelection::defaults(&cols);
        assert_eq!(sel.x.as_deref(), Some("a"));
        assert_eq!(sel.y.as_deref(), Some("b"));
        assert_eq!(sel.color, None);

        let single = PopulationSelection::defaults(&cols[..1]);
        assert_eq!(single.y.as_deref(), Some("a"));

        let none = PopulationSelection::defaults(&[]);
        assert_eq!(none, PopulationSelection::default());
    }

    #[test]
    fn validate_replaces_stale_choices() {
        let cols: Vec<String> = ["a", "b"].map(String::from).to_vec();
        let mut sel = PopulationSelection {
            x: Some("b".into()),
            y: Some("gone".into()),
            color: Some("gone".into()),
        };
        sel.validate(&cols);
        assert_eq!(sel.x.as_deref(), Some("b"));
        assert_eq!(sel.y.as_deref(), Some("b"));
        assert_eq!(sel.color, None);
        assert_eq!(sel.title(), "b vs b");
    }

    #[test]
    fn scatter_skips_points_off_log_axes() {
        let sel = PopulationSelection {
            x: Some("t_break".into()),
            y: Some("alpha_1".into()),
            color: Some("flux".into()),
        };
        let data = scatter_points(&afterglow(), &sel);
        assert_eq!(data.skipped, 2);
        assert_eq!(
            data.points,
            vec![ScatterPoint {
                name: "GRB1".into(),
                x: 300.0,
                y: 1.2,
                color: Some(1e-11),
            }]
        );
    }

    #[test]
    fn color_range_ignores_missing_values() {
        let sel = PopulationSelection {
            x: Some("t_break".into()),
            y: Some("t_break".into()),
            color: Some("flux".into()),
        };
        let data = scatter_points(&afterglow(), &sel);
        assert_eq!(data.points.len(), 3);
        assert_eq!(data.points[1].color, None);
        assert_eq!(data.color_range(), Some((3e-12, 1e-11)));
    }

    #[test]
    fn unknown_axis_yields_nothing() {
        let sel = PopulationSelection {
            x: Some("nope".into()),
            y: Some("t_break".into()),
            color: None,
        };
        assert_eq!(scatter_points(&afterglow(), &sel), ScatterData::default());
    }
}
