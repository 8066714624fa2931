use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui;

use crate::config::{Page, Settings};
use crate::data::dataset::{DatasetEntry, list_datasets};
use crate::data::images::load_figure;
use crate::data::loader::{TableCache, TableKind, find_table};
use crate::data::lookup::{BurstRecord, DatasetTables, lookup_burst, normalize_burst_name};
use crate::data::model::Table;
use crate::data::population::numeric_columns;

// ---------------------------------------------------------------------------
// Figure textures
// ---------------------------------------------------------------------------

/// A figure as the UI sees it.
#[derive(Clone)]
pub enum FigureSlot {
    Loaded(egui::TextureHandle),
    Failed(String),
}

/// Most figures kept uploaded: the XRT and BAT plots of the last few bursts.
const FIGURE_CACHE_CAPACITY: usize = 8;

/// Uploaded figure textures keyed by file path, oldest evicted first.
/// Dropping a [`egui::TextureHandle`] frees its texture.
#[derive(Default)]
pub struct FigureCache {
    slots: HashMap<PathBuf, FigureSlot>,
    order: VecDeque<PathBuf>,
}

impl FigureCache {
    /// Decode and upload `path` on first use.
    pub fn get(&mut self, ctx: &egui::Context, path: &Path) -> FigureSlot {
        if let Some(slot) = self.slots.get(path) {
            return slot.clone();
        }

        let slot = match load_figure(path) {
            Ok(fig) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(fig.size, &fig.rgba);
                let name = path.display().to_string();
                FigureSlot::Loaded(ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                log::error!("Failed to load figure: {e:#}");
                FigureSlot::Failed(format!("{e:#}"))
            }
        };

        while self.order.len() >= FIGURE_CACHE_CAPACITY {
            if let Some(old) = self.order.pop_front() {
                log::debug!("Evicting figure {}", old.display());
                self.slots.remove(&old);
            }
        }
        self.order.push_back(path.to_path_buf());
        self.slots.insert(path.to_path_buf(), slot.clone());
        slot
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    fn contains(&self, path: &Path) -> bool {
        self.slots.contains_key(path)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Selections persisted between runs.
    pub settings: Settings,

    /// Datasets found under the results directory, newest first.
    pub datasets: Vec<DatasetEntry>,

    /// Index into `datasets` of the active dataset.
    pub selected: Option<usize>,

    /// Tables of the active dataset (empty until one is selected).
    pub tables: DatasetTables,

    /// Numeric afterglow columns offered on the population page.
    pub numeric_columns: Vec<String>,

    /// Raw text of the burst search box.
    pub search_input: String,

    /// Result of the last submitted search (None while the box is blank).
    pub burst: Option<BurstRecord>,

    /// Loaded tables memoized per path.
    pub cache: TableCache,

    pub figures: FigureCache,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let mut state = Self {
            settings,
            datasets: Vec::new(),
            selected: None,
            tables: DatasetTables::default(),
            numeric_columns: Vec::new(),
            search_input: String::new(),
            burst: None,
            cache: TableCache::default(),
            figures: FigureCache::default(),
            status_message: None,
        };
        state.rescan();
        state
    }

    pub fn results_dir(&self) -> PathBuf {
        self.settings.results_dir()
    }

    pub fn dataset(&self) -> Option<&DatasetEntry> {
        self.selected.and_then(|i| self.datasets.get(i))
    }

    pub fn afterglow(&self) -> &Table {
        &self.tables.afterglow
    }

    /// Re-read the results directory and re-select the remembered dataset
    /// (or the newest one).
    pub fn rescan(&mut self) {
        let dir = self.results_dir();
        self.datasets = match list_datasets(&dir) {
            Ok(ds) => ds,
            Err(e) => {
                log::error!("Failed to scan datasets: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                Vec::new()
            }
        };

        let remembered = self.settings.dataset.clone();
        let idx = remembered
            .and_then(|folder| self.datasets.iter().position(|d| d.folder == folder))
            .or(if self.datasets.is_empty() { None } else { Some(0) });

        match idx {
            Some(i) => self.select_dataset(i),
            None => {
                self.selected = None;
                self.tables = DatasetTables::default();
                self.numeric_columns.clear();
                self.burst = None;
            }
        }
    }

    /// Point the viewer at a different results directory.
    pub fn set_results_dir(&mut self, dir: PathBuf) {
        log::info!("Results directory set to {}", dir.display());
        self.settings.results_dir = Some(dir);
        self.settings.dataset = None;
        self.status_message = None;
        self.rescan();
    }

    /// Drop cached tables and figures, then rescan.
    pub fn reload(&mut self) {
        self.cache.clear();
        self.figures.clear();
        self.status_message = None;
        self.rescan();
    }

    /// Load the three tables of dataset `idx` and refresh dependent views.
    pub fn select_dataset(&mut self, idx: usize) {
        let Some(entry) = self.datasets.get(idx).cloned() else {
            return;
        };
        self.selected = Some(idx);
        self.settings.dataset = Some(entry.folder.clone());

        let mut errors = Vec::new();
        let mut load = |kind: TableKind| -> Arc<Table> {
            match find_table(&entry.path, kind) {
                Some(path) => match self.cache.get_or_load(&path) {
                    Ok(t) => t,
                    Err(e) => {
                        log::error!("Failed to load {} table: {e:#}", kind.file_stem());
                        errors.push(format!("{e:#}"));
                        Arc::new(Table::default())
                    }
                },
                None => {
                    log::warn!(
                        "No {} table in {}",
                        kind.file_stem(),
                        entry.path.display()
                    );
                    Arc::new(Table::default())
                }
            }
        };
        self.tables = DatasetTables {
            afterglow: load(TableKind::Afterglow),
            flares: load(TableKind::Flares),
            pulses: load(TableKind::Pulses),
        };
        self.status_message = (!errors.is_empty()).then(|| format!("Error: {}", errors.join("; ")));

        self.numeric_columns = numeric_columns(&self.tables.afterglow);
        self.settings.population.validate(&self.numeric_columns);

        // Keep the current search on the new dataset.
        self.search();
    }

    /// Run the search box query against the active dataset.
    pub fn search(&mut self) {
        self.burst = normalize_burst_name(&self.search_input)
            .map(|name| lookup_burst(&self.tables, &name));
        if let Some(rec) = &self.burst {
            log::debug!("Search for {} (found: {})", rec.name, !rec.is_empty());
        }
    }

    /// Jump to a burst from outside the search box (start-up or a click in
    /// the population view).
    pub fn show_burst(&mut self, name: &str) {
        self.search_input = name.to_string();
        self.settings.page = Page::BurstViewer;
        self.search();
    }
}
