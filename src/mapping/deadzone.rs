//! Deadzone suppression for the analog stick axes.

/// The four stick-axis keys the deadzone applies to.
pub const STICK_AXIS_KEYS: [&str; 4] = ["rasX", "rasY", "lasX", "lasY"];

/// Applies the configured deadzone to one raw sample.
///
/// Stick-axis values whose magnitude fraction `abs(raw) * 2 / 65536` lies
/// strictly below `deadzone_percent / 100` collapse to exactly 0; everything
/// else, including every non-axis key, passes through unchanged. Stateless:
/// the caller re-applies this on every sample so its cached comparison
/// baseline is always an effective value.
pub fn apply(key: &str, raw: i32, deadzone_percent: u8) -> i32 {
    if !STICK_AXIS_KEYS.contains(&key) {
        return raw;
    }
    // abs(raw) * 2 / 65536 < percent / 100, cross-multiplied to stay exact
    if (raw.abs() as i64) * 200 < (deadzone_percent as i64) * 65536 {
        0
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_below_threshold_for_both_signs() {
        assert_eq!(apply("rasX", 5000, 30), 0);
        assert_eq!(apply("rasX", -5000, 30), 0);
        // 9830 * 2 / 65536 ≈ 0.2999
        assert_eq!(apply("lasY", 9830, 30), 0);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        // at 50% the fraction hits exactly 0.5 at abs == 16384
        assert_eq!(apply("rasX", 16384, 50), 16384);
        assert_eq!(apply("rasX", -16384, 50), -16384);
        assert_eq!(apply("rasX", 16383, 50), 0);
    }

    #[test]
    fn passes_values_outside_the_deadzone() {
        assert_eq!(apply("lasX", 20000, 30), 20000);
        assert_eq!(apply("rasY", -32768, 30), -32768);
    }

    #[test]
    fn ignores_non_axis_keys() {
        assert_eq!(apply("a", 1, 100), 1);
        assert_eq!(apply("ltrigger", 3, 100), 3);
        assert_eq!(apply("ras", 1, 100), 1);
    }

    #[test]
    fn zero_deadzone_passes_everything() {
        assert_eq!(apply("rasX", 1, 0), 1);
        assert_eq!(apply("rasX", 0, 0), 0);
    }
}
