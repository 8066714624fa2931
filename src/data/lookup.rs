use std::sync::Arc;

use super::loader::TableKind;
use super::model::{CellValue, Table};

/// Column holding the burst identifier in every fit table.
pub const GRB_NAME_COLUMN: &str = "GRBname";

/// Canonicalise a user query to the catalogue form `GRB<digits><letter>`.
///
/// Returns `None` for a blank query.
pub fn normalize_burst_name(query: &str) -> Option<String> {
    let upper = query.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let compact: String = upper.chars().filter(|c| *c != ' ').collect();
    if compact.starts_with("GRB") {
        Some(compact)
    } else {
        Some(format!("GRB{compact}"))
    }
}

/// Indices of rows whose `GRBname` equals `name`, ignoring case.
pub fn matching_rows(table: &Table, name: &str) -> Vec<usize> {
    let Some(col) = table.column_index(GRB_NAME_COLUMN) else {
        return Vec::new();
    };
    let wanted = name.to_uppercase();
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.get(col)
                .and_then(CellValue::as_str)
                .is_some_and(|v| v.to_uppercase() == wanted)
        })
        .map(|(i, _)| i)
        .collect()
}

/// The three fit tables of one dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetTables {
    pub afterglow: Arc<Table>,
    pub flares: Arc<Table>,
    pub pulses: Arc<Table>,
}

impl DatasetTables {
    pub fn get(&self, kind: TableKind) -> &Arc<Table> {
        match kind {
            TableKind::Afterglow => &self.afterglow,
            TableKind::Flares => &self.flares,
            TableKind::Pulses => &self.pulses,
        }
    }
}

/// Rows matched in one table for one burst.
#[derive(Debug, Clone)]
pub struct TableMatch {
    pub kind: TableKind,
    pub table: Arc<Table>,
    pub rows: Vec<usize>,
}

impl TableMatch {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Transposed view: one `(column, values per matched row)` entry per
    /// column, the layout the parameter tables are drawn in.
    pub fn parameters(&self) -> Vec<(&str, Vec<&CellValue>)> {
        self.table
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let values = self
                    .rows
                    .iter()
                    .filter_map(|&r| self.table.rows.get(r)?.get(c))
                    .collect();
                (name.as_str(), values)
            })
            .collect()
    }
}

/// Everything known about one burst in the selected dataset.
#[derive(Debug, Clone)]
pub struct BurstRecord {
    /// Normalised burst name.
    pub name: String,
    /// Matches in afterglow, flares and pulses order.
    pub matches: Vec<TableMatch>,
}

impl BurstRecord {
    /// True when no table mentions the burst.
    pub fn is_empty(&self) -> bool {
        self.matches.iter().all(TableMatch::is_empty)
    }

    pub fn get(&self, kind: TableKind) -> Option<&TableMatch> {
        self.matches.iter().find(|m| m.kind == kind)
    }
}

/// Filter every table of a dataset by a normalised burst name.
pub fn lookup_burst(tables: &DatasetTables, name: &str) -> BurstRecord {
    let matches = TableKind::ALL
        .iter()
        .map(|&kind| {
            let table = Arc::clone(tables.get(kind));
            let rows = matching_rows(&table, name);
            TableMatch { kind, table, rows }
        })
        .collect();
    BurstRecord {
        name: name.to_string(),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str]) -> Table {
        let mut t = Table::new(vec![GRB_NAME_COLUMN.into(), "alpha".into()]);
        for (i, n) in names.iter().enumerate() {
            t.push_row(vec![CellValue::Text(n.to_string()), CellValue::Integer(i as i64)]);
        }
        t
    }

    #[test]
    fn normalization_adds_prefix_and_strips_spaces() {
        assert_eq!(normalize_burst_name("210112a").as_deref(), Some("GRB210112A"));
        assert_eq!(normalize_burst_name("  grb 210112 a ").as_deref(), Some("GRB210112A"));
        assert_eq!(normalize_burst_name("GRB050525A").as_deref(), Some("GRB050525A"));
        assert_eq!(normalize_burst_name("   "), None);
        assert_eq!(normalize_burst_name(""), None);
    }

    #[test]
    fn match_is_exact_and_case_insensitive() {
        let t = table(&["GRB210112A", "grb210112a", "GRB210112AB", "GRB050525A"]);
        assert_eq!(matching_rows(&t, "GRB210112A"), vec![0, 1]);
        assert!(matching_rows(&t, "GRB2101").is_empty());
    }

    #[test]
    fn table_without_name_column_matches_nothing() {
        let mut t = Table::new(vec!["name".into()]);
        t.push_row(vec![CellValue::Text("GRB1".into())]);
        assert!(matching_rows(&t, "GRB1").is_empty());
    }

    #[test]
    fn lookup_collects_every_table() {
        let tables = DatasetTables {
            afterglow: Arc::new(table(&["GRB1", "GRB2"])),
            flares: Arc::new(table(&["GRB2", "GRB2", "GRB3"])),
            pulses: Arc::new(Table::default()),
        };

        let rec = lookup_burst(&tables, "GRB2");
        assert!(!rec.is_empty());
        assert_eq!(rec.get(TableKind::Afterglow).unwrap().rows, vec![1]);
        assert_eq!(rec.get(TableKind::Flares).unwrap().rows, vec![0, 1]);
        assert!(rec.get(TableKind::Pulses).unwrap().is_empty());

        assert!(lookup_burst(&tables, "GRB9").is_empty());
    }

    #[test]
    fn parameters_are_transposed_per_matched_row() {
        let tables = DatasetTables {
            flares: Arc::new(table(&["GRB2", "GRB1", "GRB2"])),
            ..Default::default()
        };
        let rec = lookup_burst(&tables, "GRB2");
        let params = rec.get(TableKind::Flares).unwrap().parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].0, "alpha");
        assert_eq!(params[1].1, vec![&CellValue::Integer(0), &CellValue::Integer(2)]);
    }
}
