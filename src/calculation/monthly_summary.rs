//! Monthly aggregation of daily summaries.

use chrono::Datelike;

use crate::config::WorkTimeRules;
use crate::models::{MonthlySummary, WorkSummary};

use super::rounding::round_minutes;

/// Aggregates daily summaries into monthly totals.
///
/// Only summaries whose work date falls in `year`/`month` are counted.
/// Totals are rounded to the coarser `monthly_rounding_minutes`.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::aggregate_monthly;
/// use punch_engine::config::WorkTimeRules;
/// use punch_engine::models::WorkSummary;
/// use chrono::NaiveDate;
///
/// let day = WorkSummary {
///     work_minutes: 470,
///     is_complete: true,
///     ..WorkSummary::incomplete(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
/// };
/// let month = aggregate_monthly(2026, 1, &[day], &WorkTimeRules::default());
/// assert_eq!(month.days_worked, 1);
/// assert_eq!(month.work_minutes, 480); // 470 rounded to 30
/// ```
pub fn aggregate_monthly(
    year: i32,
    month: u32,
    summaries: &[WorkSummary],
    rules: &WorkTimeRules,
) -> MonthlySummary {
    let in_month = summaries
        .iter()
        .filter(|s| s.work_date.year() == year && s.work_date.month() == month);

    let mut days_worked = 0;
    let mut incomplete_days = 0;
    let mut work = 0;
    let mut breaks = 0;
    let mut night = 0;
    let mut overtime_normal = 0;
    let mut overtime_late = 0;

    for summary in in_month {
        if !summary.is_complete {
            incomplete_days += 1;
            continue;
        }
        days_worked += 1;
        work += summary.work_minutes;
        breaks += summary.break_minutes;
        night += summary.night_minutes;
        overtime_normal += summary.overtime_normal_minutes;
        overtime_late += summary.overtime_late_minutes;
    }

    let unit = rules.monthly_rounding_minutes;
    MonthlySummary {
        year,
        month,
        days_worked,
        incomplete_days,
        work_minutes: round_minutes(work, unit),
        break_minutes: round_minutes(breaks, unit),
        night_minutes: round_minutes(night, unit),
        overtime_normal_minutes: round_minutes(overtime_normal, unit),
        overtime_late_minutes: round_minutes(overtime_late, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_day(date: &str, work: i64, overtime_normal: i64, night: i64) -> WorkSummary {
        WorkSummary {
            work_minutes: work,
            break_minutes: 60,
            overtime_normal_minutes: overtime_normal,
            night_minutes: night,
            is_complete: true,
            ..WorkSummary::incomplete(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
        }
    }

    #[test]
    fn test_totals_are_summed_and_rounded() {
        let days = vec![
            make_day("2026-01-05", 487, 7, 0),
            make_day("2026-01-06", 512, 32, 20),
            make_day("2026-01-07", 480, 0, 0),
        ];

        let month = aggregate_monthly(2026, 1, &days, &WorkTimeRules::default());
        assert_eq!(month.days_worked, 3);
        // 1479 -> 1470 (remainder 9 of 30 rounds down)
        assert_eq!(month.work_minutes, 1470);
        // 39 -> 30
        assert_eq!(month.overtime_normal_minutes, 30);
        // 20 -> 30 (half or more rounds up)
        assert_eq!(month.night_minutes, 30);
        assert_eq!(month.break_minutes, 180);
    }

    #[test]
    fn test_incomplete_days_are_counted_not_summed() {
        let days = vec![
            make_day("2026-01-05", 480, 0, 0),
            WorkSummary::incomplete(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()),
        ];

        let month = aggregate_monthly(2026, 1, &days, &WorkTimeRules::default());
        assert_eq!(month.days_worked, 1);
        assert_eq!(month.incomplete_days, 1);
        assert_eq!(month.work_minutes, 480);
    }

    #[test]
    fn test_days_outside_the_month_are_ignored() {
        let days = vec![
            make_day("2025-12-31", 480, 0, 0),
            make_day("2026-01-02", 480, 0, 0),
            make_day("2026-02-01", 480, 0, 0),
        ];

        let month = aggregate_monthly(2026, 1, &days, &WorkTimeRules::default());
        assert_eq!(month.days_worked, 1);
        assert_eq!(month.work_minutes, 480);
    }

    #[test]
    fn test_empty_month() {
        let month = aggregate_monthly(2026, 2, &[], &WorkTimeRules::default());
        assert_eq!(month.days_worked, 0);
        assert_eq!(month.work_minutes, 0);
    }
}
