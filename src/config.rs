use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::population::PopulationSelection;

/// Default results directory, relative to the working directory.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Command line of the viewer.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "grb-fit-viewer", version, about = "Browse precomputed GRB light-curve fits")]
pub struct Args {
    /// Folder holding one sub-folder per dataset (`YYMM_version`).
    #[arg(long, env = "GRB_VIEWER_RESULTS")]
    pub results_dir: Option<PathBuf>,

    /// Dataset folder to open first, e.g. `2401_5.1`.
    #[arg(long)]
    pub dataset: Option<String>,

    /// Burst to show on start-up, e.g. `GRB210112A`.
    #[arg(long)]
    pub grb: Option<String>,
}

/// Page shown in the central panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    #[default]
    BurstViewer,
    Population,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::BurstViewer, Page::Population];

    pub fn label(self) -> &'static str {
        match self {
            Page::BurstViewer => "Burst Viewer",
            Page::Population => "Population Results",
        }
    }
}

/// UI selections remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub results_dir: Option<PathBuf>,
    pub dataset: Option<String>,
    pub page: Page,
    pub population: PopulationSelection,
}

impl Settings {
    /// Command line values override persisted ones.
    pub fn merge_args(mut self, args: &Args) -> Self {
        if let Some(dir) = &args.results_dir {
            self.results_dir = Some(dir.clone());
        }
        if let Some(ds) = &args.dataset {
            self.dataset = Some(ds.clone());
        }
        if args.grb.is_some() {
            self.page = Page::BurstViewer;
        }
        self
    }

    pub fn results_dir(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "grb-fit-viewer",
            "--results-dir",
            "/data/results",
            "--dataset",
            "2401_5.1",
            "--grb",
            "210112A",
        ])
        .unwrap();
        assert_eq!(args.results_dir, Some(PathBuf::from("/data/results")));
        assert_eq!(args.dataset.as_deref(), Some("2401_5.1"));
        assert_eq!(args.grb.as_deref(), Some("210112A"));
    }

    #[test]
    fn command_line_overrides_persisted_settings() {
        let stored = Settings {
            results_dir: Some("old".into()),
            dataset: Some("2301_4.0".into()),
            page: Page::Population,
            ..Default::default()
        };
        let args = Args {
            dataset: Some("2401_5.1".into()),
            grb: Some("GRB1".into()),
            ..Default::default()
        };
        let merged = stored.merge_args(&args);
        assert_eq!(merged.results_dir(), PathBuf::from("old"));
        assert_eq!(merged.dataset.as_deref(), Some("2401_5.1"));
        assert_eq!(merged.page, Page::BurstViewer);
    }

    #[test]
    fn results_dir_defaults() {
        assert_eq!(Settings::default().results_dir(), PathBuf::from(DEFAULT_RESULTS_DIR));
    }

    #[test]
    fn settings_survive_json_with_missing_fields() {
        let s: Settings = serde_json::from_str(r#"{"page":"Population"}"#).unwrap();
        assert_eq!(s.page, Page::Population);
        assert_eq!(s.dataset, None);
    }
}
