use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};

use crate::error::SeriesError;

/// Gradient start used when none is configured.
pub const DEFAULT_GRADIENT_START: &str = "#00C6BF";
/// Gradient end used when none is configured.
pub const DEFAULT_GRADIENT_END: &str = "#B430C2";

// ---------------------------------------------------------------------------
// Hex colours
// ---------------------------------------------------------------------------

/// Parse `#rrggbb`, `rrggbb` or `#rgb`.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>, SeriesError> {
    Srgb::<u8>::from_str(hex.trim())
        .map_err(|e| SeriesError::InvalidArgument(format!("bad hex colour '{hex}': {e}")))
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// Gradient generator
// ---------------------------------------------------------------------------

/// `num` colours stepping from `start_hex` to `end_hex`, both ends included.
///
/// Hue, saturation and lightness are interpolated linearly and independently,
/// so the hue sweeps the plain numeric way between the two endpoints rather
/// than around the shorter arc.
pub fn gradient_gen(start_hex: &str, end_hex: &str, num: usize) -> Result<Vec<Srgb<u8>>, SeriesError> {
    let start = parse_hex(start_hex)?;
    let end = parse_hex(end_hex)?;
    Ok(gradient(start, end, num))
}

/// Same as [`gradient_gen`] for already-parsed colours.
pub fn gradient(start: Srgb<u8>, end: Srgb<u8>, num: usize) -> Vec<Srgb<u8>> {
    match num {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }
    let a: Hsl = start.into_format::<f32>().into_color();
    let b: Hsl = end.into_format::<f32>().into_color();
    let (ha, hb) = (a.hue.into_positive_degrees(), b.hue.into_positive_degrees());
    let last = (num - 1) as f32;

    (0..num)
        .map(|i| {
            if i == 0 {
                return start;
            }
            if i == num - 1 {
                return end;
            }
            let t = i as f32 / last;
            let hsl = Hsl::new(
                ha + (hb - ha) * t,
                a.saturation + (b.saturation - a.saturation) * t,
                a.lightness + (b.lightness - a.lightness) * t,
            );
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}
