//! Daily overtime detection and tier split.
//!
//! Worked time beyond the daily threshold is overtime. Overtime is paid in
//! two tiers: the first tier ("normal") up to a configured limit, anything
//! further counts as "late" overtime.

use serde::{Deserialize, Serialize};

use crate::config::WorkTimeRules;

/// Worked minutes split into regular time and the two overtime tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// Minutes up to the daily threshold.
    pub regular_minutes: i64,
    /// Overtime minutes in the first tier.
    pub normal_minutes: i64,
    /// Overtime minutes beyond the first tier.
    pub late_minutes: i64,
}

/// Splits worked minutes into regular time and overtime tiers.
///
/// # Arguments
///
/// * `work_minutes` - The worked minutes for the day (breaks already removed)
/// * `rules` - Threshold and first-tier limit
///
/// # Examples
///
/// ## Under the threshold
///
/// ```
/// use punch_engine::calculation::split_overtime;
/// use punch_engine::config::WorkTimeRules;
///
/// let split = split_overtime(420, &WorkTimeRules::default());
/// assert_eq!(split.regular_minutes, 420);
/// assert_eq!(split.normal_minutes, 0);
/// ```
///
/// ## Both tiers
///
/// ```
/// use punch_engine::calculation::split_overtime;
/// use punch_engine::config::WorkTimeRules;
///
/// // 11 hours worked: 8 regular, 2 normal overtime, 1 late overtime
/// let split = split_overtime(660, &WorkTimeRules::default());
/// assert_eq!(split.regular_minutes, 480);
/// assert_eq!(split.normal_minutes, 120);
/// assert_eq!(split.late_minutes, 60);
/// ```
pub fn split_overtime(work_minutes: i64, rules: &WorkTimeRules) -> OvertimeSplit {
    let work_minutes = work_minutes.max(0);
    let overtime = (work_minutes - rules.overtime_threshold_minutes).max(0);
    let normal = overtime.min(rules.normal_overtime_limit_minutes);

    OvertimeSplit {
        regular_minutes: work_minutes - overtime,
        normal_minutes: normal,
        late_minutes: overtime - normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exactly_at_threshold_has_no_overtime() {
        let split = split_overtime(480, &WorkTimeRules::default());
        assert_eq!(split.regular_minutes, 480);
        assert_eq!(split.normal_minutes, 0);
        assert_eq!(split.late_minutes, 0);
    }

    #[test]
    fn test_two_hours_over_is_all_normal() {
        let split = split_overtime(600, &WorkTimeRules::default());
        assert_eq!(split.normal_minutes, 120);
        assert_eq!(split.late_minutes, 0);
    }

    #[test]
    fn test_beyond_first_tier_is_late() {
        let split = split_overtime(615, &WorkTimeRules::default());
        assert_eq!(split.normal_minutes, 120);
        assert_eq!(split.late_minutes, 15);
    }

    #[test]
    fn test_custom_threshold() {
        let rules = WorkTimeRules {
            overtime_threshold_minutes: 450,
            normal_overtime_limit_minutes: 30,
            ..WorkTimeRules::default()
        };
        let split = split_overtime(500, &rules);
        assert_eq!(split.regular_minutes, 450);
        assert_eq!(split.normal_minutes, 30);
        assert_eq!(split.late_minutes, 20);
    }

    #[test]
    fn test_negative_input_is_clamped() {
        let split = split_overtime(-10, &WorkTimeRules::default());
        assert_eq!(split.regular_minutes, 0);
    }

    proptest! {
        #[test]
        fn prop_split_sums_to_worked_minutes(work in 0i64..2_000) {
            let rules = WorkTimeRules::default();
            let split = split_overtime(work, &rules);
            prop_assert_eq!(split.regular_minutes + split.normal_minutes + split.late_minutes, work);
            prop_assert!(split.regular_minutes <= rules.overtime_threshold_minutes);
            prop_assert!(split.normal_minutes <= rules.normal_overtime_limit_minutes);
        }
    }
}
