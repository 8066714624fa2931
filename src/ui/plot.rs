use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{GridInput, GridMark, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{ColorScale, DEFAULT_POINT_COLOR, MISSING_COLOR};
use crate::data::population::{PopulationSelection, ScatterData};

/// Number of colour bins used when a colour column is active.
pub const COLOR_BINS: usize = 24;

// ---------------------------------------------------------------------------
// Log axes: points are placed at log10 coordinates, grid and tick labels are
// translated back to data units.
// ---------------------------------------------------------------------------

/// Most decade marks drawn on one axis.
const MAX_DECADE_MARKS: f64 = 50.0;

/// Decade grid with 2..9 minor marks, in log10 space. Spans wider than
/// [`MAX_DECADE_MARKS`] decades drop the minor marks and thin the decades.
fn log_grid_spacer(input: GridInput) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    if !(min.is_finite() && max.is_finite()) || max < min {
        return vec![];
    }
    let (first, last) = (min.floor(), max.ceil());
    let span = last - first;

    if span > MAX_DECADE_MARKS {
        let step = (span / MAX_DECADE_MARKS).ceil();
        let start = (first / step).floor() * step;
        return (0..=MAX_DECADE_MARKS as usize + 1)
            .map(|k| start + k as f64 * step)
            .filter(|v| (min..=max).contains(v))
            .map(|value| GridMark {
                value,
                step_size: step,
            })
            .collect();
    }

    let mut marks = vec![];
    let mut decade = first;
    while decade <= last {
        marks.extend(
            (1..10)
                .map(|j| {
                    let value = decade + (j as f64).log10();
                    let step_size = if j == 1 { 1.0 } else { 0.1 };
                    GridMark { value, step_size }
                })
                .filter(|gm| (min..=max).contains(&gm.value)),
        );
        decade += 1.0;
    }
    marks
}

/// Label only whole decades.
fn log_axis_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.step_size < 1.0 {
        return String::new();
    }
    format_value(10f64.powf(mark.value))
}

fn format_value(v: f64) -> String {
    if (1e-2..1e4).contains(&v.abs()) {
        format!("{v:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        format!("{v:.2e}")
    }
}

/// Index of the point nearest to `target` (log coordinates).
fn nearest(points: &[[f64; 2]], target: &PlotPoint) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p[0] - target.x).powi(2) + (p[1] - target.y).powi(2)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Population scatter plot
// ---------------------------------------------------------------------------

/// Draw the population scatter plot on log-log axes.
///
/// Returns the name of the burst the user clicked, if any.
pub fn population_plot(
    ui: &mut Ui,
    data: &ScatterData,
    selection: &PopulationSelection,
    scale: Option<&ColorScale>,
) -> Option<String> {
    let log_points: Vec<[f64; 2]> = data
        .points
        .iter()
        .map(|p| [p.x.log10(), p.y.log10()])
        .collect();

    // Group points by colour bin so each bin is one plot item.
    let mut series: Vec<(Color32, Vec<[f64; 2]>)> = match scale {
        Some(scale) => {
            let mut bins: Vec<(Color32, Vec<[f64; 2]>)> = (0..scale.n_bins())
                .map(|b| (scale.bin_color(b), Vec::new()))
                .collect();
            let mut missing = Vec::new();
            for (p, lp) in data.points.iter().zip(&log_points) {
                match scale.bin_for(p.color) {
                    Some(b) => bins[b].1.push(*lp),
                    None => missing.push(*lp),
                }
            }
            bins.push((MISSING_COLOR, missing));
            bins
        }
        None => vec![(DEFAULT_POINT_COLOR, log_points.clone())],
    };
    series.retain(|(_, pts)| !pts.is_empty());

    let names: Vec<String> = data.points.iter().map(|p| p.name.clone()).collect();
    let hover_points = log_points.clone();
    let x_label = selection.x.clone().unwrap_or_default();
    let y_label = selection.y.clone().unwrap_or_default();
    let (hover_x, hover_y) = (x_label.clone(), y_label.clone());

    let response = Plot::new("population_plot")
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_grid_spacer(log_grid_spacer)
        .y_grid_spacer(log_grid_spacer)
        .x_axis_formatter(log_axis_formatter)
        .y_axis_formatter(log_axis_formatter)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |_name, value| {
            let real = format!(
                "{hover_x} = {}\n{hover_y} = {}",
                format_value(10f64.powf(value.x)),
                format_value(10f64.powf(value.y))
            );
            match nearest(&hover_points, value) {
                Some(i) if hover_points[i] == [value.x, value.y] => {
                    format!("{}\n{real}", names[i])
                }
                _ => real,
            }
        })
        .show(ui, |plot_ui| {
            for (color, pts) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .color(color)
                        .radius(3.0)
                        .filled(true),
                );
            }
        });

    if response.response.clicked() {
        let pointer = response.response.interact_pointer_pos()?;
        let target = response.transform.value_from_position(pointer);
        let i = nearest(&log_points, &target)?;
        let on_screen = response
            .transform
            .position_from_point(&PlotPoint::new(log_points[i][0], log_points[i][1]));
        if on_screen.distance(pointer) <= 8.0 {
            return data.points.get(i).map(|p| p.name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_marks_cover_decades_and_minors() {
        let marks = log_grid_spacer(GridInput {
            bounds: (0.0, 1.0),
            base_step_size: 0.1,
        });
        let decades: Vec<f64> = marks
            .iter()
            .filter(|m| m.step_size == 1.0)
            .map(|m| m.value)
            .collect();
        assert_eq!(decades, vec![0.0, 1.0]);
        assert_eq!(marks.len(), 10);
    }

    #[test]
    fn wide_spans_keep_grid_bounded() {
        for bounds in [(-1e6, 1e6), (-3e12, 4e12), (0.0, 80.0)] {
            let marks = log_grid_spacer(GridInput {
                bounds,
                base_step_size: 1.0,
            });
            assert!(!marks.is_empty());
            assert!(marks.len() <= MAX_DECADE_MARKS as usize + 2, "{bounds:?}");
            assert!(marks.iter().all(|m| m.step_size >= 1.0));
            assert!(marks.iter().all(|m| (bounds.0..=bounds.1).contains(&m.value)));
        }
        let nan = log_grid_spacer(GridInput {
            bounds: (f64::NAN, 1.0),
            base_step_size: 1.0,
        });
        assert!(nan.is_empty());
    }

    #[test]
    fn only_decades_are_labelled() {
        let range = 0.0..=1.0;
        let decade = GridMark { value: 2.0, step_size: 1.0 };
        let minor = GridMark { value: 2.3, step_size: 0.1 };
        assert_eq!(log_axis_formatter(decade, &range), "100");
        assert_eq!(log_axis_formatter(minor, &range), "");
        assert_eq!(format_value(1e-5), "1.00e-5");
        assert_eq!(format_value(0.25), "0.25");
    }

    #[test]
    fn nearest_point_by_distance() {
        let pts = [[0.0, 0.0], [1.0, 1.0], [2.0, 0.5]];
        assert_eq!(nearest(&pts, &PlotPoint::new(1.9, 0.4)), Some(2));
        assert_eq!(nearest(&[], &PlotPoint::new(0.0, 0.0)), None);
    }
}
