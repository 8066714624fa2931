use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Table kinds stored per dataset
// ---------------------------------------------------------------------------

/// The three fit tables every dataset folder provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Afterglow,
    Flares,
    Pulses,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Afterglow, TableKind::Flares, TableKind::Pulses];

    /// File stem inside the dataset folder.
    pub fn file_stem(self) -> &'static str {
        match self {
            TableKind::Afterglow => "afterglow",
            TableKind::Flares => "flares",
            TableKind::Pulses => "pulses",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TableKind::Afterglow => "Afterglow",
            TableKind::Flares => "Flares",
            TableKind::Pulses => "Pulses",
        }
    }
}

/// Extensions probed, in order, when locating a table file.
const TABLE_EXTENSIONS: [&str; 3] = ["csv", "json", "parquet"];

/// Locate the file backing `kind` in a dataset folder.
pub fn find_table(dataset_dir: &Path, kind: TableKind) -> Option<PathBuf> {
    TABLE_EXTENSIONS
        .iter()
        .map(|ext| dataset_dir.join(format!("{}.{ext}", kind.file_stem())))
        .find(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a fit table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one burst component per line
/// * `.json`    – `[{ "GRBname": "...", "alpha": 1.2, ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats or bools
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Memoized loading
// ---------------------------------------------------------------------------

/// Loaded tables keyed by file path. Tables are immutable once read, so a
/// path is parsed at most once until [`TableCache::clear`].
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<PathBuf, Arc<Table>>,
}

impl TableCache {
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Table>> {
        if let Some(table) = self.tables.get(path) {
            log::debug!("table cache hit: {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(
            load_table(path).with_context(|| format!("loading {}", path.display()))?,
        );
        log::info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.display()
        );
        self.tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one record.
/// Cell types are guessed per cell, see [`guess_cell_type`].
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > table.columns.len() {
            bail!(
                "CSV row {row_no}: {} fields but only {} columns",
                record.len(),
                table.columns.len()
            );
        }
        table.push_row(record.iter().map(guess_cell_type).collect());
    }

    Ok(table)
}

/// Tokens read as missing values, following the usual dataframe defaults.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "GRBname": "GRB210112A", "alpha_1": 1.2, "t_break": 3400.0 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; keys missing from a record are
/// null.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut table = Table::default();
    let mut parsed = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if table.column_index(key).is_none() {
                table.columns.push(key.clone());
            }
        }
        parsed.push(obj);
    }

    for obj in parsed {
        let row = table
            .columns
            .iter()
            .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars
/// (`df.write_parquet()`). Scalar columns only; nested columns are shown as
/// their type name.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col.as_ref(), row))
                .collect();
            table.push_row(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => {
            CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => {
            nan_to_null(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => nan_to_null(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::Text(format!("{other:?}")),
    }
}

/// Pandas writes missing floats as NaN rather than Arrow nulls.
fn nan_to_null(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "afterglow.csv",
            "GRBname,n_breaks,alpha_1,t_break,good\nGRB210112A,2,1.25,,True\nGRB050525A,0,NaN,3.4e3,false\n",
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, ["GRBname", "n_breaks", "alpha_1", "t_break", "good"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Text("GRB210112A".into()));
        assert_eq!(table.rows[0][1], CellValue::Integer(2));
        assert_eq!(table.rows[0][2], CellValue::Float(1.25));
        assert_eq!(table.rows[0][3], CellValue::Null);
        assert_eq!(table.rows[0][4], CellValue::Bool(true));
        assert_eq!(table.rows[1][2], CellValue::Null);
        assert_eq!(table.rows[1][3], CellValue::Float(3400.0));
    }

    #[test]
    fn spreadsheet_missing_markers_are_null() {
        for token in ["#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN", "<NA>"] {
            assert_eq!(guess_cell_type(token), CellValue::Null, "{token}");
        }
        assert_eq!(guess_cell_type(" NA "), CellValue::Null);
        assert_eq!(guess_cell_type("#N/B"), CellValue::Text("#N/B".into()));
    }

    #[test]
    fn csv_short_rows_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "pulses.csv", "GRBname,a,b\nGRB1,1\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0], [CellValue::Text("GRB1".into()), CellValue::Integer(1), CellValue::Null]);
    }

    #[test]
    fn csv_long_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "pulses.csv", "GRBname,a\nGRB1,1,2\n");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn json_records_keep_first_seen_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "flares.json",
            r#"[{"GRBname":"GRB1","t_peak":120.5},{"GRBname":"GRB2","t_peak":null,"idx":3}]"#,
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, ["GRBname", "t_peak", "idx"]);
        assert_eq!(table.rows[0][2], CellValue::Null);
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Integer(3));
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "flares.json", r#"{"GRBname":"GRB1"}"#);
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn parquet_columns_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afterglow.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("GRBname", DataType::Utf8, false),
            Field::new("alpha_1", DataType::Float64, true),
            Field::new("n_breaks", DataType::Int64, false),
            Field::new("good", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["GRB1", "GRB2"])),
                Arc::new(Float64Array::from(vec![Some(1.5), Some(f64::NAN)])),
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, ["GRBname", "alpha_1", "n_breaks", "good"]);
        assert_eq!(table.rows[0][1], CellValue::Float(1.5));
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Integer(2));
        assert_eq!(table.rows[1][3], CellValue::Bool(false));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "afterglow.xlsx", "");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn find_table_prefers_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "flares.json", "[]");
        assert_eq!(
            find_table(dir.path(), TableKind::Flares),
            Some(dir.path().join("flares.json"))
        );
        write_file(dir.path(), "flares.csv", "GRBname\n");
        assert_eq!(
            find_table(dir.path(), TableKind::Flares),
            Some(dir.path().join("flares.csv"))
        );
        assert_eq!(find_table(dir.path(), TableKind::Pulses), None);
    }

    #[test]
    fn cache_loads_each_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "afterglow.csv", "GRBname\nGRB1\n");
        let mut cache = TableCache::default();
        let first = cache.get_or_load(&path).unwrap();

        // A rewrite is not seen until the cache is cleared.
        write_file(dir.path(), "afterglow.csv", "GRBname\nGRB1\nGRB2\n");
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        cache.clear();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);
    }
}
