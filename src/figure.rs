//! Renderer-independent figure descriptions.
//!
//! Each builder turns store groups plus a [`FigureConfig`] into a [`Figure`]:
//! plain point lists, colours and text placements. The viewer draws them with
//! `egui_plot`; nothing here knows about a GUI.

use palette::Srgb;

use crate::color::{generate_palette, gradient_gen, parse_hex};
use crate::config::{Annotation, AxisLimits, FigureConfig};
use crate::data::model::{SeriesGroup, SeriesKind};
use crate::data::partition::{partition_group, partition_group_paired, GroupCycle};
use crate::data::store::convert_axis;
use crate::error::SeriesError;

const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);
const DIFF_GREY: Srgb<u8> = Srgb::new(0xBE, 0xBE, 0xBE);

// ---------------------------------------------------------------------------
// Figure model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    /// Solid line with a dot at every sample.
    Markers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    /// Legend entry; unnamed lines stay out of the legend.
    pub name: Option<String>,
    pub points: Vec<[f64; 2]>,
    pub color: Srgb<u8>,
    pub width: f32,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LineSpec>,
    pub texts: Vec<TextSpec>,
    pub x_limits: Option<AxisLimits>,
    pub y_limits: Option<AxisLimits>,
    pub legend: bool,
    /// Format tick labels with [`crate::format::reformat_ticks`].
    pub thousands_ticks: bool,
}

impl Figure {
    fn new(x_label: &str, y_label: &str, config: &FigureConfig) -> Self {
        let mut texts = Vec::new();
        if let Some(title) = &config.title {
            texts.push(title_text(title));
        }
        Figure {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            lines: Vec::new(),
            texts,
            x_limits: config.x_limits,
            y_limits: config.y_limits,
            legend: false,
            thousands_ticks: config.thousands_ticks,
        }
    }

    /// Bounding box of every plotted point as `([x_min, y_min], [x_max, y_max])`.
    pub fn data_bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        self.lines
            .iter()
            .flat_map(|l| l.points.iter())
            .filter(|p| p[0].is_finite() && p[1].is_finite())
            .fold(None, |acc, p| match acc {
                None => Some((*p, *p)),
                Some((lo, hi)) => Some((
                    [lo[0].min(p[0]), lo[1].min(p[1])],
                    [hi[0].max(p[0]), hi[1].max(p[1])],
                )),
            })
    }

    /// Initial view as `([x_min, y_min], [x_max, y_max])`. Configured limits
    /// win per axis; an axis without limits falls back to the data extent.
    pub fn view_bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let data = self.data_bounds();
        let axis = |limits: Option<AxisLimits>, i: usize| {
            limits
                .map(|l| (l.min, l.max))
                .or_else(|| data.map(|(lo, hi)| (lo[i], hi[i])))
        };
        let (x_min, x_max) = axis(self.x_limits, 0)?;
        let (y_min, y_max) = axis(self.y_limits, 1)?;
        Some(([x_min, y_min], [x_max, y_max]))
    }
}

fn title_text(title: &Annotation) -> TextSpec {
    TextSpec {
        text: title.text.clone(),
        x: title.x,
        y: title.y,
        anchor: Anchor::TopLeft,
        size: 16.0,
    }
}

fn zip_points(x: &[f64], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter().zip(y).map(|(&xi, &yi)| [xi, yi]).collect()
}

fn cycle_points(cycle: &GroupCycle<'_>, x: &str, y: &str) -> Vec<[f64; 2]> {
    match (cycle.column(x), cycle.column(y)) {
        (Some(xs), Some(ys)) => zip_points(xs, ys),
        _ => Vec::new(),
    }
}

fn kind_mismatch(group: &SeriesGroup, expected: &'static str) -> SeriesError {
    SeriesError::KindMismatch {
        tag: group.tag().to_string(),
        expected,
        actual: group.kind().name(),
    }
}

// ---------------------------------------------------------------------------
// Chronopotentiometry
// ---------------------------------------------------------------------------

/// Potential vs. time for every cycle of a CP run.
///
/// Positive and negative cycle `i` share gradient colour `i`. When the two
/// halves hold different cycle counts, `config.pair_policy` decides between
/// plotting the common prefix and failing.
pub fn cp_figure(
    pos: &SeriesGroup,
    neg: &SeriesGroup,
    config: &FigureConfig,
) -> Result<Figure, SeriesError> {
    for group in [pos, neg] {
        if !matches!(group.kind(), SeriesKind::Cp { .. }) {
            return Err(kind_mismatch(group, "CP"));
        }
    }

    let cycles = partition_group_paired(pos, neg, config.cycle_pts)?;
    let pairs = cycles.pairs(config.pair_policy)?;
    let colors = gradient_gen(&config.gradient.start, &config.gradient.end, pairs.len())?;

    let mut figure = Figure::new("Time (s)", "E_we (V)", config);
    for ((p, n), color) in pairs.iter().zip(colors) {
        for cycle in [p, n] {
            figure.lines.push(LineSpec {
                name: None,
                points: cycle_points(cycle, "time", "potential"),
                color,
                width: 1.5,
                style: LineStyle::Solid,
            });
        }
    }

    let mut info = Vec::new();
    if let Some(j) = config.current_density {
        info.push(format!("j = {j} µA·cm⁻²"));
    }
    info.push(format!("{} Cycles", pairs.len()));

    let [x, y] = match (config.info_position, figure.data_bounds()) {
        (Some(at), _) => at,
        (None, Some((_, hi))) => hi,
        (None, None) => [0.0, 0.0],
    };
    figure.texts.push(TextSpec {
        text: info.join("\n"),
        x,
        y,
        anchor: Anchor::TopRight,
        size: 14.0,
    });
    Ok(figure)
}

// ---------------------------------------------------------------------------
// Impedance
// ---------------------------------------------------------------------------

/// Nyquist plot, one gradient-coloured line per EIS cycle.
pub fn eis_figure(group: &SeriesGroup, config: &FigureConfig) -> Result<Figure, SeriesError> {
    if !matches!(group.kind(), SeriesKind::Eis { .. }) {
        return Err(kind_mismatch(group, "EIS"));
    }
    let sorted = group.sorted_by_time();
    let cycles = partition_group(&sorted, config.cycle_pts)?;
    let colors = gradient_gen(&config.gradient.start, &config.gradient.end, cycles.len())?;

    let mut figure = Figure::new("Z′ (Ω)", "−Z″ (Ω)", config);
    figure.legend = true;
    for (cycle, color) in cycles.iter().zip(colors) {
        figure.lines.push(LineSpec {
            name: Some(format!("Cycle {}", cycle.index + 1)),
            points: cycle_points(cycle, "re_z", "neg_im_z"),
            color,
            width: 1.5,
            style: LineStyle::Markers,
        });
    }
    Ok(figure)
}

// ---------------------------------------------------------------------------
// Diffraction
// ---------------------------------------------------------------------------

/// Diffraction patterns on a common x-axis (`config.xrd_axis`), pattern `i`
/// shifted up by `i * config.xrd_offset`.
pub fn xrd_figure(groups: &[&SeriesGroup], config: &FigureConfig) -> Result<Figure, SeriesError> {
    let mut figure = Figure::new(config.xrd_axis.label(), "Intensity (a.u.)", config);
    figure.legend = true;

    let colors = generate_palette(groups.len());
    for (i, (group, color)) in groups.iter().zip(colors).enumerate() {
        let converted = convert_axis(group, config.xrd_axis, config.wavelength)?;
        let (Some(x), Some(intensity)) = (converted.column("x"), converted.column("intensity"))
        else {
            return Err(kind_mismatch(group, "XRD"));
        };
        let shift = i as f64 * config.xrd_offset;
        figure.lines.push(LineSpec {
            name: Some(group.tag().to_string()),
            points: x
                .iter()
                .zip(intensity.iter())
                .map(|(&xi, &yi)| [xi, yi + shift])
                .collect(),
            color,
            width: 1.5,
            style: LineStyle::Solid,
        });
    }
    Ok(figure)
}

// ---------------------------------------------------------------------------
// Pair distribution function
// ---------------------------------------------------------------------------

/// Observed G(r) with its fit and, optionally, the difference curve.
pub fn pdf_figure(group: &SeriesGroup, config: &FigureConfig) -> Result<Figure, SeriesError> {
    let SeriesKind::Pdf { r, g, fit } = group.kind() else {
        return Err(kind_mismatch(group, "PDF"));
    };
    let fit_color = parse_hex(&config.fit_color)?;

    let mut figure = Figure::new("r (Å)", "G(r) (Å⁻²)", config);
    figure.legend = true;
    figure.lines.push(LineSpec {
        name: Some("Observed".to_string()),
        points: zip_points(r, g),
        color: BLACK,
        width: 1.0,
        style: LineStyle::Markers,
    });
    if let Some(fit) = fit {
        figure.lines.push(LineSpec {
            name: Some("Calculated".to_string()),
            points: zip_points(r, &fit.calc),
            color: fit_color,
            width: 2.0,
            style: LineStyle::Solid,
        });
        if config.add_diff {
            figure.lines.push(LineSpec {
                name: Some("Difference".to_string()),
                points: zip_points(r, &fit.diff),
                color: DIFF_GREY,
                width: 1.0,
                style: LineStyle::Solid,
            });
        }
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{PdfFit, Series, XAxis};

    fn cp(tag: &str, n: usize) -> SeriesGroup {
        SeriesGroup::new(
            tag,
            SeriesKind::Cp {
                time: (0..n).map(|i| i as f64).collect(),
                potential: (0..n).map(|i| (i % 3) as f64 * 0.1).collect(),
            },
        )
        .unwrap()
    }

    fn config(cycle_pts: usize) -> FigureConfig {
        FigureConfig {
            cycle_pts,
            ..Default::default()
        }
    }

    #[test]
    fn cp_pairs_follow_shorter_half() {
        let fig = cp_figure(&cp("pos", 9), &cp("neg", 6), &config(3)).unwrap();
        assert_eq!(fig.lines.len(), 4);
        // cycle colours shared between halves
        assert_eq!(fig.lines[0].color, fig.lines[1].color);
        assert_eq!(fig.lines[2].color, fig.lines[3].color);
        assert_ne!(fig.lines[0].color, fig.lines[2].color);
        assert!(fig.texts.iter().any(|t| t.text.contains("2 Cycles")));
    }

    #[test]
    fn cp_strict_policy_reports_mismatch() {
        let strict = FigureConfig {
            pair_policy: crate::data::partition::PairPolicy::Strict,
            ..config(3)
        };
        assert!(matches!(
            cp_figure(&cp("pos", 9), &cp("neg", 6), &strict),
            Err(SeriesError::CycleMismatch { a: 3, b: 2 })
        ));
    }

    #[test]
    fn cp_info_mentions_current_density() {
        let cfg = FigureConfig {
            current_density: Some(50.0),
            info_position: Some([100.0, 1.0]),
            ..config(3)
        };
        let fig = cp_figure(&cp("pos", 6), &cp("neg", 6), &cfg).unwrap();
        let info = fig.texts.last().unwrap();
        assert_eq!(info.text, "j = 50 µA·cm⁻²\n2 Cycles");
        assert_eq!((info.x, info.y), (100.0, 1.0));
        assert_eq!(info.anchor, Anchor::TopRight);
    }

    #[test]
    fn cp_rejects_other_kinds() {
        let pdf = SeriesGroup::new(
            "pdf",
            SeriesKind::Pdf {
                r: Series::from(vec![1.0]),
                g: Series::from(vec![1.0]),
                fit: None,
            },
        )
        .unwrap();
        assert!(matches!(
            cp_figure(&cp("pos", 3), &pdf, &config(1)),
            Err(SeriesError::KindMismatch { .. })
        ));
    }

    #[test]
    fn pdf_difference_is_optional() {
        let group = SeriesGroup::new(
            "fit",
            SeriesKind::Pdf {
                r: Series::from(vec![1.0, 2.0]),
                g: Series::from(vec![0.5, 0.7]),
                fit: Some(PdfFit {
                    calc: Series::from(vec![0.4, 0.8]),
                    diff: Series::from(vec![0.1, -0.1]),
                }),
            },
        )
        .unwrap();
        assert_eq!(pdf_figure(&group, &config(1)).unwrap().lines.len(), 2);

        let with_diff = FigureConfig {
            add_diff: true,
            ..config(1)
        };
        let fig = pdf_figure(&group, &with_diff).unwrap();
        assert_eq!(fig.lines.len(), 3);
        assert_eq!(fig.lines[2].color, DIFF_GREY);
    }

    #[test]
    fn xrd_offsets_stack_patterns() {
        let make = |tag: &str| {
            SeriesGroup::new(
                tag,
                SeriesKind::Xrd {
                    axis: XAxis::TwoTheta,
                    x: Series::from(vec![10.0, 20.0]),
                    intensity: Series::from(vec![1.0, 2.0]),
                    uncertainty: None,
                },
            )
            .unwrap()
        };
        let (a, b) = (make("a"), make("b"));
        let cfg = FigureConfig {
            xrd_offset: 10.0,
            ..Default::default()
        };
        let fig = xrd_figure(&[&a, &b], &cfg).unwrap();
        assert_eq!(fig.lines[1].points[0], [10.0, 11.0]);
        assert_eq!(fig.x_label, XAxis::TwoTheta.label());
    }

    #[test]
    fn view_bounds_prefer_configured_limits() {
        let group = SeriesGroup::new(
            "a",
            SeriesKind::Xrd {
                axis: XAxis::TwoTheta,
                x: Series::from(vec![10.0, 20.0]),
                intensity: Series::from(vec![1.0, 2.0]),
                uncertainty: None,
            },
        )
        .unwrap();

        let fig = xrd_figure(&[&group], &FigureConfig::default()).unwrap();
        assert_eq!(fig.view_bounds(), Some(([10.0, 1.0], [20.0, 2.0])));

        let cfg = FigureConfig {
            x_limits: Some(AxisLimits { min: 12.0, max: 15.0 }),
            cycle_pts: 10,
            ..Default::default()
        };
        let fig = xrd_figure(&[&group], &cfg).unwrap();
        assert_eq!(fig.view_bounds(), Some(([12.0, 1.0], [15.0, 2.0])));

        // nothing plotted and only one axis pinned
        let empty = cp_figure(&cp("pos", 2), &cp("neg", 2), &cfg).unwrap();
        assert!(empty.lines.is_empty());
        assert_eq!(empty.view_bounds(), None);

        let pinned = FigureConfig {
            y_limits: Some(AxisLimits { min: -1.0, max: 1.0 }),
            ..cfg
        };
        let empty = cp_figure(&cp("pos", 2), &cp("neg", 2), &pinned).unwrap();
        assert_eq!(empty.view_bounds(), Some(([12.0, -1.0], [15.0, 1.0])));
    }
}
