//! Work-day attribution.
//!
//! A work day does not start at midnight: punches before the configured
//! cutoff hour belong to the previous calendar date, so an overnight shift
//! (23:10 → 02:30) stays on one work day.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Returns the work date a punch timestamp is attributed to.
///
/// # Arguments
///
/// * `timestamp` - Local wall-clock time of the punch
/// * `cutoff_hour` - Hour (0-23) at which a new work day starts
///
/// # Example
///
/// ```
/// use punch_engine::calculation::work_date;
/// use chrono::NaiveDate;
///
/// let night = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap().and_hms_opt(2, 30, 0).unwrap();
/// assert_eq!(work_date(night, 5), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
///
/// let morning = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap().and_hms_opt(6, 0, 0).unwrap();
/// assert_eq!(work_date(morning, 5), NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
/// ```
pub fn work_date(timestamp: NaiveDateTime, cutoff_hour: u32) -> NaiveDate {
    let date = timestamp.date();
    if timestamp.hour() < cutoff_hour {
        date.checked_sub_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    }
}

/// Returns the half-open window `[start, end)` covered by a work date.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::work_day_bounds;
/// use chrono::NaiveDate;
///
/// let (start, end) = work_day_bounds(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(), 5);
/// assert_eq!(start.to_string(), "2026-01-15 05:00:00");
/// assert_eq!(end.to_string(), "2026-01-16 05:00:00");
/// ```
pub fn work_day_bounds(work_date: NaiveDate, cutoff_hour: u32) -> (NaiveDateTime, NaiveDateTime) {
    let cutoff = NaiveTime::from_hms_opt(cutoff_hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let start = work_date.and_time(cutoff);
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}
