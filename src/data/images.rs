use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Instruments with pre-rendered fit figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Xrt,
    Bat,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Xrt, Instrument::Bat];

    /// Sub-directory of `figures/` holding this instrument's plots.
    pub fn dir_name(self) -> &'static str {
        match self {
            Instrument::Xrt => "xrt",
            Instrument::Bat => "bat",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Instrument::Xrt => "XRT",
            Instrument::Bat => "BAT",
        }
    }
}

/// `<dataset>/figures/<instrument>/<name>.png`
pub fn figure_path(dataset_dir: &Path, instrument: Instrument, grb_name: &str) -> PathBuf {
    dataset_dir
        .join("figures")
        .join(instrument.dir_name())
        .join(format!("{grb_name}.png"))
}

/// The figure path if the file exists.
pub fn resolve_figure(dataset_dir: &Path, instrument: Instrument, grb_name: &str) -> Option<PathBuf> {
    let path = figure_path(dataset_dir, instrument, grb_name);
    path.is_file().then_some(path)
}

/// Decoded RGBA pixels of one figure.
#[derive(Debug, Clone)]
pub struct FigureImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

pub fn load_figure(path: &Path) -> Result<FigureImage> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(FigureImage {
        size,
        rgba: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_folder_convention() {
        let p = figure_path(Path::new("results/2401_5.1"), Instrument::Bat, "GRB210112A");
        assert_eq!(p, Path::new("results/2401_5.1/figures/bat/GRB210112A.png"));
    }

    #[test]
    fn resolve_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let xrt = dir.path().join("figures/xrt");
        std::fs::create_dir_all(&xrt).unwrap();
        image::RgbaImage::new(3, 2)
            .save(xrt.join("GRB1.png"))
            .unwrap();

        let found = resolve_figure(dir.path(), Instrument::Xrt, "GRB1").unwrap();
        assert!(resolve_figure(dir.path(), Instrument::Bat, "GRB1").is_none());
        assert!(resolve_figure(dir.path(), Instrument::Xrt, "GRB2").is_none());

        let fig = load_figure(&found).unwrap();
        assert_eq!(fig.size, [3, 2]);
        assert_eq!(fig.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn undecodable_figure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GRB1.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(load_figure(&path).is_err());
    }
}
