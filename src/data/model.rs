use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a fit table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring the dtypes a fit table carries.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => {
                // Fit parameters span many decades; switch to scientific
                // notation outside a readable range.
                let a = v.abs();
                if *v != 0.0 && v.is_finite() && !(1e-3..1e5).contains(&a) {
                    write!(f, "{v:.4e}")
                } else {
                    write!(f, "{v:.4}")
                }
            }
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Integer, float and null cells may all live in a numeric column.
    pub fn is_numeric_compatible(&self) -> bool {
        matches!(
            self,
            CellValue::Integer(_) | CellValue::Float(_) | CellValue::Null
        )
    }
}

// ---------------------------------------------------------------------------
// Table – one loaded fit table (afterglow, flares or pulses)
// ---------------------------------------------------------------------------

/// Row-major table with ordered column names.
///
/// Every row has exactly `columns.len()` cells; loaders pad short rows with
/// [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate all cells of one column.
    pub fn column_values<'a>(&'a self, col: usize) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().filter_map(move |r| r.get(col))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_pads_to_column_count() {
        let mut t = Table::new(vec!["GRBname".into(), "alpha".into()]);
        t.push_row(vec![CellValue::Text("GRB1".into())]);
        assert_eq!(t.rows[0].len(), 2);
        assert!(t.rows[0][1].is_null());
    }

    #[test]
    fn numeric_compatibility() {
        assert!(CellValue::Null.is_numeric_compatible());
        assert!(CellValue::Integer(3).is_numeric_compatible());
        assert!(!CellValue::Text("3".into()).is_numeric_compatible());
        assert!(!CellValue::Bool(true).is_numeric_compatible());
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
    }

    #[test]
    fn float_display_uses_scientific_for_extremes() {
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5000");
        assert_eq!(CellValue::Float(0.0).to_string(), "0.0000");
        assert_eq!(CellValue::Float(2.5e-12).to_string(), "2.5000e-12");
        assert_eq!(CellValue::Float(123456.0).to_string(), "1.2346e5");
    }
}
