use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset folder naming: `YYMM_version`
// ---------------------------------------------------------------------------

/// Why a results sub-folder is not a dataset.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetNameError {
    #[error("'{0}' is not of the form YYMM_version")]
    MissingSeparator(String),
    #[error("'{0}': date part must be four digits (YYMM)")]
    BadDate(String),
    #[error("'{0}': month {1} is out of range")]
    BadMonth(String, u32),
    #[error("'{0}': empty version")]
    EmptyVersion(String),
}

/// One selectable dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Folder name, e.g. `2401_5.1`.
    pub folder: String,
    /// Display label, e.g. `01/2024 (laff v5.1)`.
    pub label: String,
    /// Full path of the dataset folder.
    pub path: PathBuf,
}

/// Map a `YYMM_version` folder name to its display label.
pub fn beautify_dataset_name(folder: &str) -> Result<String, DatasetNameError> {
    let mut parts = folder.split('_');
    let (Some(date), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DatasetNameError::MissingSeparator(folder.to_string()));
    };

    if date.len() != 4 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DatasetNameError::BadDate(folder.to_string()));
    }
    if version.is_empty() {
        return Err(DatasetNameError::EmptyVersion(folder.to_string()));
    }

    let (yy, mm) = date.split_at(2);
    let month: u32 = mm
        .parse()
        .map_err(|_| DatasetNameError::BadDate(folder.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(DatasetNameError::BadMonth(folder.to_string(), month));
    }

    Ok(format!("{mm}/20{yy} (laff v{version})"))
}

/// Enumerate dataset folders under `results_dir`, newest first.
///
/// Entries that are not directories or whose names do not parse are skipped
/// with a warning.
pub fn list_datasets(results_dir: &Path) -> Result<Vec<DatasetEntry>> {
    let entries = std::fs::read_dir(results_dir)
        .with_context(|| format!("reading results directory {}", results_dir.display()))?;

    let mut datasets = Vec::new();
    for entry in entries {
        let entry = entry.context("reading results directory entry")?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(folder) = entry.file_name().to_str().map(str::to_string) else {
            log::warn!("Skipping non UTF-8 folder {}", path.display());
            continue;
        };
        match beautify_dataset_name(&folder) {
            Ok(label) => datasets.push(DatasetEntry {
                folder,
                label,
                path,
            }),
            Err(e) => log::warn!("Skipping results folder: {e}"),
        }
    }

    datasets.sort_by(|a, b| b.folder.cmp(&a.folder));
    log::info!(
        "Found {} dataset(s) in {}",
        datasets.len(),
        results_dir.display()
    );
    Ok(datasets)
}
