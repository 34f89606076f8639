// ---------------------------------------------------------------------------
// Tick labels for large axis values
// ---------------------------------------------------------------------------

/// Shorten a tick value for display: thousands become units (`150000 → 150`),
/// everything is rounded to one decimal and a trailing `.0` is dropped.
///
/// The axis label has to say "(×10³ …)" itself; this only rewrites numbers.
pub fn reformat_ticks(tick_val: f64) -> String {
    if !tick_val.is_finite() {
        return tick_val.to_string();
    }
    let scaled = if tick_val.abs() >= 1000.0 {
        tick_val / 1000.0
    } else {
        tick_val
    };
    let rounded = round_one_decimal(scaled);
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let text = format!("{rounded:.1}");
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// Round to one decimal, ties to even, judged on the exact binary value
/// (`0.25 → 0.2`, but `0.15 → 0.1` since 0.15 is stored slightly low).
fn round_one_decimal(value: f64) -> f64 {
    let tenths = value * 10.0;
    let floor = tenths.floor();
    let steps = if tenths - floor == 0.5 {
        // product rounding error tells which side of the tie the exact value is on
        let err = value.mul_add(10.0, -tenths);
        if err > 0.0 {
            floor + 1.0
        } else if err < 0.0 {
            floor
        } else {
            tenths.round_ties_even()
        }
    } else {
        tenths.round()
    };
    steps / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_scaled() {
        assert_eq!(reformat_ticks(1500.0), "1.5");
        assert_eq!(reformat_ticks(2000.0), "2");
        assert_eq!(reformat_ticks(150_000.0), "150");
        assert_eq!(reformat_ticks(-2500.0), "-2.5");
        assert_eq!(reformat_ticks(1000.0), "1");
    }

    #[test]
    fn small_values_are_rounded() {
        assert_eq!(reformat_ticks(12.34), "12.3");
        assert_eq!(reformat_ticks(999.0), "999");
        assert_eq!(reformat_ticks(-0.04), "0");
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(reformat_ticks(0.25), "0.2");
        assert_eq!(reformat_ticks(0.75), "0.8");
        assert_eq!(reformat_ticks(-0.25), "-0.2");
        assert_eq!(reformat_ticks(2250.0), "2.2");
        assert_eq!(reformat_ticks(0.15), "0.1");
        assert_eq!(reformat_ticks(0.26), "0.3");
    }
}
