use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scale (plasma-like) for numeric colour encoding
// ---------------------------------------------------------------------------

/// Control points of the plasma colour map, dark to bright.
const PLASMA_STOPS: [(u8, u8, u8); 6] = [
    (13, 8, 135),
    (106, 0, 168),
    (177, 42, 144),
    (225, 100, 98),
    (252, 166, 54),
    (240, 249, 33),
];

/// Colour used for points without a colour value.
pub const MISSING_COLOR: Color32 = Color32::GRAY;

/// Default marker colour when no colour column is selected.
pub const DEFAULT_POINT_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

/// Sample the gradient at `t` in `[0, 1]`, interpolating in linear RGB.
pub fn plasma(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (PLASMA_STOPS.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(PLASMA_STOPS.len() - 2);
    let frac = pos - i as f32;

    let to_lin = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = to_lin(PLASMA_STOPS[i]).mix(to_lin(PLASMA_STOPS[i + 1]), frac);
    let rgb = Srgb::<f32>::from_linear(mixed).into_format::<u8>();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Maps a numeric range onto a fixed number of colour bins.
///
/// Points are drawn one series per bin, so the number of bins bounds the
/// number of plot items.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    bins: Vec<Color32>,
}

impl ColorScale {
    pub fn new(min: f64, max: f64, n_bins: usize) -> Self {
        let n = n_bins.max(1);
        let bins = (0..n)
            .map(|i| {
                let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
                plasma(t)
            })
            .collect();
        ColorScale { min, max, bins }
    }

    /// Bin index for a value; `None` for missing or non-finite values.
    pub fn bin_for(&self, value: Option<f64>) -> Option<usize> {
        let v = value.filter(|v| v.is_finite())?;
        let n = self.bins.len();
        let span = self.max - self.min;
        if span <= 0.0 {
            return Some(n / 2);
        }
        let t = ((v - self.min) / span).clamp(0.0, 1.0);
        Some(((t * n as f64) as usize).min(n - 1))
    }

    pub fn bin_color(&self, bin: usize) -> Color32 {
        self.bins.get(bin).copied().unwrap_or(MISSING_COLOR)
    }

    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Lower bound of a bin in data units, for legend labels.
    pub fn bin_start(&self, bin: usize) -> f64 {
        self.min + (self.max - self.min) * bin as f64 / self.bins.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(plasma(0.0), Color32::from_rgb(13, 8, 135));
        assert_eq!(plasma(1.0), Color32::from_rgb(240, 249, 33));
        assert_eq!(plasma(-3.0), plasma(0.0));
        assert_eq!(plasma(f32::NAN), plasma(0.0));
    }

    #[test]
    fn values_map_to_bins() {
        let scale = ColorScale::new(0.0, 10.0, 5);
        assert_eq!(scale.bin_for(Some(0.0)), Some(0));
        assert_eq!(scale.bin_for(Some(3.0)), Some(1));
        assert_eq!(scale.bin_for(Some(10.0)), Some(4));
        assert_eq!(scale.bin_for(Some(99.0)), Some(4));
        assert_eq!(scale.bin_for(None), None);
        assert_eq!(scale.bin_for(Some(f64::NAN)), None);
        assert_eq!(scale.bin_color(0), plasma(0.0));
        assert_eq!(scale.bin_color(99), MISSING_COLOR);
        assert_eq!(scale.bin_start(2), 4.0);
    }

    #[test]
    fn degenerate_range_uses_middle_bin() {
        let scale = ColorScale::new(2.0, 2.0, 8);
        assert_eq!(scale.bin_for(Some(2.0)), Some(4));
    }
}
