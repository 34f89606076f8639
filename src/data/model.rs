use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// Series – one measured quantity
// ---------------------------------------------------------------------------

/// An ordered, immutable run of samples (potential, intensity, G(r), …).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    values: Vec<f64>,
}

impl Series {
    pub fn new(values: Vec<f64>) -> Self {
        Series { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Smallest and largest finite sample, `None` for an empty or all-NaN series.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl Deref for Series {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::new(values)
    }
}

impl FromIterator<f64> for Series {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Series::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// XAxis – unit of a diffraction pattern's x column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum XAxis {
    /// Scattering angle 2θ in degrees.
    #[default]
    TwoTheta,
    /// Momentum transfer in Å⁻¹.
    Q,
}

impl XAxis {
    pub fn label(&self) -> &'static str {
        match self {
            XAxis::TwoTheta => "2θ (°)",
            XAxis::Q => "Q (Å⁻¹)",
        }
    }
}

impl fmt::Display for XAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XAxis::TwoTheta => write!(f, "2θ"),
            XAxis::Q => write!(f, "Q"),
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesKind – which columns a tag carries
// ---------------------------------------------------------------------------

/// Refinement columns that accompany an observed PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfFit {
    pub calc: Series,
    pub diff: Series,
}

/// The parallel columns stored under one tag, decided once at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    /// One half (positive or negative current) of a chronopotentiometry run.
    Cp { time: Series, potential: Series },
    /// Impedance trace in Nyquist coordinates.
    Eis {
        time: Series,
        re_z: Series,
        neg_im_z: Series,
    },
    /// Diffraction pattern; `.xye` files carry an uncertainty column, `.xy` don't.
    Xrd {
        axis: XAxis,
        x: Series,
        intensity: Series,
        uncertainty: Option<Series>,
    },
    /// Pair distribution function with an optional fit.
    Pdf {
        r: Series,
        g: Series,
        fit: Option<PdfFit>,
    },
}

impl SeriesKind {
    pub fn name(&self) -> &'static str {
        match self {
            SeriesKind::Cp { .. } => "CP",
            SeriesKind::Eis { .. } => "EIS",
            SeriesKind::Xrd { .. } => "XRD",
            SeriesKind::Pdf { .. } => "PDF",
        }
    }

    /// Named view of every column, in a fixed order per kind.
    pub fn columns(&self) -> Vec<(&'static str, &Series)> {
        match self {
            SeriesKind::Cp { time, potential } => vec![("time", time), ("potential", potential)],
            SeriesKind::Eis {
                time,
                re_z,
                neg_im_z,
            } => vec![("time", time), ("re_z", re_z), ("neg_im_z", neg_im_z)],
            SeriesKind::Xrd {
                x,
                intensity,
                uncertainty,
                ..
            } => {
                let mut cols = vec![("x", x), ("intensity", intensity)];
                if let Some(err) = uncertainty {
                    cols.push(("uncertainty", err));
                }
                cols
            }
            SeriesKind::Pdf { r, g, fit } => {
                let mut cols = vec![("r", r), ("g", g)];
                if let Some(fit) = fit {
                    cols.push(("calc", &fit.calc));
                    cols.push(("diff", &fit.diff));
                }
                cols
            }
        }
    }

    /// Time column for time-resolved kinds.
    pub fn time(&self) -> Option<&Series> {
        match self {
            SeriesKind::Cp { time, .. } | SeriesKind::Eis { time, .. } => Some(time),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesGroup – a tag and its columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    tag: String,
    kind: SeriesKind,
}

impl SeriesGroup {
    /// Build a group, rejecting columns of unequal length.
    pub fn new(tag: impl Into<String>, kind: SeriesKind) -> Result<Self, SeriesError> {
        let columns = kind.columns();
        if let Some((_, first)) = columns.first() {
            let expected = first.len();
            for &(column, series) in &columns[1..] {
                if series.len() != expected {
                    return Err(SeriesError::LengthMismatch {
                        column,
                        expected,
                        actual: series.len(),
                    });
                }
            }
        }
        Ok(SeriesGroup {
            tag: tag.into(),
            kind,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> &SeriesKind {
        &self.kind
    }

    /// Number of samples in each column.
    pub fn len(&self) -> usize {
        self.kind
            .columns()
            .first()
            .map(|(_, s)| s.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.kind
            .columns()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| s)
    }

    /// Copy of this group with every column reordered by ascending time.
    ///
    /// Kinds without a time column are returned unchanged.
    pub fn sorted_by_time(&self) -> SeriesGroup {
        let Some(time) = self.kind.time() else {
            return self.clone();
        };
        let mut order: Vec<usize> = (0..time.len()).collect();
        order.sort_by(|&a, &b| time[a].total_cmp(&time[b]));
        let pick = |s: &Series| -> Series { order.iter().map(|&i| s[i]).collect() };

        let kind = match &self.kind {
            SeriesKind::Cp { time, potential } => SeriesKind::Cp {
                time: pick(time),
                potential: pick(potential),
            },
            SeriesKind::Eis {
                time,
                re_z,
                neg_im_z,
            } => SeriesKind::Eis {
                time: pick(time),
                re_z: pick(re_z),
                neg_im_z: pick(neg_im_z),
            },
            other => other.clone(),
        };
        SeriesGroup {
            tag: self.tag.clone(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[f64]) -> Series {
        Series::new(v.to_vec())
    }

    #[test]
    fn rejects_unequal_columns() {
        let kind = SeriesKind::Xrd {
            axis: XAxis::TwoTheta,
            x: s(&[10.0, 20.0, 30.0]),
            intensity: s(&[1.0, 2.0, 3.0]),
            uncertainty: Some(s(&[0.1, 0.2])),
        };
        match SeriesGroup::new("LiCoO2", kind) {
            Err(SeriesError::LengthMismatch {
                column,
                expected,
                actual,
            }) => {
                assert_eq!(column, "uncertainty");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn columns_follow_optional_fields() {
        let bare = SeriesKind::Pdf {
            r: s(&[1.0]),
            g: s(&[0.5]),
            fit: None,
        };
        assert_eq!(bare.columns().len(), 2);

        let fitted = SeriesKind::Pdf {
            r: s(&[1.0]),
            g: s(&[0.5]),
            fit: Some(PdfFit {
                calc: s(&[0.4]),
                diff: s(&[0.1]),
            }),
        };
        let names: Vec<&str> = fitted.columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["r", "g", "calc", "diff"]);
    }

    #[test]
    fn sort_by_time_moves_all_columns() {
        let group = SeriesGroup::new(
            "eis",
            SeriesKind::Eis {
                time: s(&[3.0, 1.0, 2.0]),
                re_z: s(&[30.0, 10.0, 20.0]),
                neg_im_z: s(&[-3.0, -1.0, -2.0]),
            },
        )
        .unwrap();
        let sorted = group.sorted_by_time();
        assert_eq!(sorted.column("time").unwrap().as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.column("re_z").unwrap().as_slice(), &[10.0, 20.0, 30.0]);
        assert_eq!(
            sorted.column("neg_im_z").unwrap().as_slice(),
            &[-1.0, -2.0, -3.0]
        );
        // source untouched
        assert_eq!(group.column("time").unwrap().as_slice(), &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn range_skips_nan() {
        let series = s(&[2.0, f64::NAN, -1.0, 5.0]);
        assert_eq!(series.range(), Some((-1.0, 5.0)));
        assert_eq!(Series::default().range(), None);
    }
}
