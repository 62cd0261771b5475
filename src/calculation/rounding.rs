//! Duration rounding.

/// Rounds `minutes` to the nearest multiple of `unit`, halves rounding up.
///
/// A unit of 1 or less leaves the value untouched.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::round_minutes;
///
/// assert_eq!(round_minutes(487, 15), 480);
/// assert_eq!(round_minutes(488, 15), 495);
/// assert_eq!(round_minutes(15, 30), 30);
/// assert_eq!(round_minutes(14, 30), 0);
/// ```
pub fn round_minutes(minutes: i64, unit: i64) -> i64 {
    if unit <= 1 {
        return minutes;
    }

    let remainder = minutes.rem_euclid(unit);
    let floor = minutes - remainder;
    if remainder * 2 >= unit {
        floor + unit
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_multiples_are_unchanged() {
        assert_eq!(round_minutes(480, 15), 480);
        assert_eq!(round_minutes(0, 30), 0);
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(round_minutes(15, 30), 30);
        assert_eq!(round_minutes(45, 30), 60);
        assert_eq!(round_minutes(5, 10), 10);
    }

    #[test]
    fn test_below_half_rounds_down() {
        assert_eq!(round_minutes(44, 30), 30);
        assert_eq!(round_minutes(4, 10), 0);
    }

    #[test]
    fn test_unit_of_one_is_identity() {
        assert_eq!(round_minutes(487, 1), 487);
        assert_eq!(round_minutes(487, 0), 487);
    }

    proptest! {
        #[test]
        fn prop_result_is_nearest_multiple(minutes in 0i64..100_000, unit in 2i64..120) {
            let rounded = round_minutes(minutes, unit);
            prop_assert_eq!(rounded % unit, 0);
            prop_assert!((rounded - minutes).abs() * 2 <= unit);
        }
    }
}
