use std::f64::consts::PI;

use super::model::Series;
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// 2θ <-> Q conversion
// ---------------------------------------------------------------------------

/// Cu Kα wavelength in Å.
pub const COPPER_WAVELENGTH: f64 = 1.54;

fn check_wavelength(wavelength: f64) -> Result<(), SeriesError> {
    if !wavelength.is_finite() || wavelength <= 0.0 {
        return Err(SeriesError::InvalidArgument(format!(
            "wavelength must be positive, got {wavelength}"
        )));
    }
    Ok(())
}

/// `Q = 4π · sin(2θ · π/360) / λ`, with 2θ in degrees.
pub fn angle_to_momentum_transfer(angles: &[f64], wavelength: f64) -> Result<Series, SeriesError> {
    check_wavelength(wavelength)?;
    Ok(angles
        .iter()
        .map(|&two_theta| 4.0 * PI * (two_theta * PI / 360.0).sin() / wavelength)
        .collect())
}

/// `2θ = (360/π) · asin(Q · λ / 4π)`, the inverse of [`angle_to_momentum_transfer`].
///
/// Fails on the first sample whose arcsine argument leaves `[-1, 1]`.
pub fn momentum_transfer_to_angle(q_values: &[f64], wavelength: f64) -> Result<Series, SeriesError> {
    check_wavelength(wavelength)?;
    q_values
        .iter()
        .enumerate()
        .map(|(index, &q)| {
            let argument = q * wavelength / (4.0 * PI);
            if !(-1.0..=1.0).contains(&argument) {
                return Err(SeriesError::DomainError {
                    index,
                    value: q,
                    argument,
                });
            }
            Ok(360.0 * argument.asin() / PI)
        })
        .collect::<Result<Vec<f64>, _>>()
        .map(Series::from)
}
