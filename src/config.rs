use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::{parse_hex, DEFAULT_GRADIENT_END, DEFAULT_GRADIENT_START};
use crate::data::model::XAxis;
use crate::data::partition::PairPolicy;
use crate::data::transform::COPPER_WAVELENGTH;
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// Figure configuration
// ---------------------------------------------------------------------------

/// Inclusive axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}

/// Text placed at a data coordinate, e.g. a figure title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub start: String,
    pub end: String,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_GRADIENT_START.to_string(),
            end: DEFAULT_GRADIENT_END.to_string(),
        }
    }
}

/// Every knob the figure builders read.
///
/// Loaded from JSON; missing keys take their defaults:
///
/// ```json
/// { "cycle_pts": 120, "wavelength": 0.1665, "x_limits": { "min": 0, "max": 3600 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Samples per cycle for CP / EIS segmentation.
    pub cycle_pts: usize,
    /// Instrument wavelength in Å.
    pub wavelength: f64,
    /// Lines to skip at the top of text column files.
    pub header_rows: usize,
    pub gradient: GradientConfig,
    pub x_limits: Option<AxisLimits>,
    pub y_limits: Option<AxisLimits>,
    pub pair_policy: PairPolicy,
    pub title: Option<Annotation>,
    /// Current density in µA·cm⁻², shown in the CP info box.
    pub current_density: Option<f64>,
    /// Where the CP info box is anchored (top-right corner).
    pub info_position: Option<[f64; 2]>,
    /// Colour of the calculated PDF curve.
    pub fit_color: String,
    /// Also draw the PDF difference curve.
    pub add_diff: bool,
    /// x-axis unit for diffraction figures.
    pub xrd_axis: XAxis,
    /// Vertical shift between stacked diffraction patterns.
    pub xrd_offset: f64,
    /// Show axis ticks in thousands.
    pub thousands_ticks: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            cycle_pts: 1,
            wavelength: COPPER_WAVELENGTH,
            header_rows: 0,
            gradient: GradientConfig::default(),
            x_limits: None,
            y_limits: None,
            pair_policy: PairPolicy::default(),
            title: None,
            current_density: None,
            info_position: None,
            fit_color: "#D62728".to_string(),
            add_diff: false,
            xrd_axis: XAxis::default(),
            xrd_offset: 0.0,
            thousands_ticks: false,
        }
    }
}

impl FigureConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: FigureConfig = serde_json::from_str(&text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.cycle_pts == 0 {
            return Err(SeriesError::InvalidArgument(
                "cycle_pts must be at least 1".to_string(),
            ));
        }
        if !self.wavelength.is_finite() || self.wavelength <= 0.0 {
            return Err(SeriesError::InvalidArgument(format!(
                "wavelength must be positive, got {}",
                self.wavelength
            )));
        }
        for limits in [self.x_limits, self.y_limits].into_iter().flatten() {
            if !(limits.min < limits.max) {
                return Err(SeriesError::InvalidArgument(format!(
                    "axis limits must satisfy min < max, got {} .. {}",
                    limits.min, limits.max
                )));
            }
        }
        parse_hex(&self.gradient.start)?;
        parse_hex(&self.gradient.end)?;
        parse_hex(&self.fit_color)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FigureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gradient.start, "#00C6BF");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: FigureConfig =
            serde_json::from_str(r#"{ "cycle_pts": 120, "pair_policy": "Strict" }"#).unwrap();
        assert_eq!(config.cycle_pts, 120);
        assert_eq!(config.pair_policy, PairPolicy::Strict);
        assert_eq!(config.wavelength, COPPER_WAVELENGTH);
    }

    #[test]
    fn negative_cycle_pts_does_not_parse() {
        assert!(serde_json::from_str::<FigureConfig>(r#"{ "cycle_pts": -3 }"#).is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let zero = FigureConfig {
            cycle_pts: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(SeriesError::InvalidArgument(_))));

        let wl = FigureConfig {
            wavelength: -1.0,
            ..Default::default()
        };
        assert!(wl.validate().is_err());

        let limits = FigureConfig {
            x_limits: Some(AxisLimits { min: 5.0, max: 1.0 }),
            ..Default::default()
        };
        assert!(limits.validate().is_err());
    }
}
