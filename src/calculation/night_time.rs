//! Night-time overlap.
//!
//! Night minutes are tracked separately for night-differential pay. The span
//! is walked in hour-aligned segments, the same way shifts are split at
//! midnight, and each segment whose hour falls inside the night window adds
//! its length.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::WorkTimeRules;

/// A clock-time window given in whole hours; may wrap past midnight.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::NightWindow;
///
/// let window = NightWindow::new(22, 5);
/// assert!(window.contains_hour(23));
/// assert!(window.contains_hour(4));
/// assert!(!window.contains_hour(5));
/// assert!(!window.contains_hour(21));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// First hour inside the window.
    pub start_hour: u32,
    /// First hour after the window.
    pub end_hour: u32,
}

impl NightWindow {
    /// Creates a window from `start_hour` (inclusive) to `end_hour` (exclusive).
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// The window configured in the work-time rules.
    pub fn from_rules(rules: &WorkTimeRules) -> Self {
        Self::new(rules.night_start_hour, rules.night_end_hour)
    }

    /// Returns true if the hour starting at `hour`:00 lies inside the window.
    pub fn contains_hour(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Returns the whole minutes of `[start, end)` that fall inside `window`.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::{night_minutes, NightWindow};
/// use chrono::NaiveDateTime;
///
/// let start = NaiveDateTime::parse_from_str("2026-01-15 23:10:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2026-01-16 02:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(night_minutes(start, end, NightWindow::new(22, 5)), 200);
/// ```
pub fn night_minutes(start: NaiveDateTime, end: NaiveDateTime, window: NightWindow) -> i64 {
    let mut night_seconds = 0;
    let mut cursor = start;

    while cursor < end {
        let hour_start = cursor
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(cursor);
        let segment_end = (hour_start + Duration::hours(1)).min(end);

        if window.contains_hour(cursor.hour()) {
            night_seconds += (segment_end - cursor).num_seconds();
        }
        cursor = segment_end;
    }

    night_seconds / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn default_window() -> NightWindow {
        NightWindow::new(22, 5)
    }

    #[test]
    fn test_day_shift_has_no_night_minutes() {
        let minutes = night_minutes(
            make_datetime("2026-01-15 09:00:00"),
            make_datetime("2026-01-15 18:00:00"),
            default_window(),
        );
        assert_eq!(minutes, 0);
    }

    #[test]
    fn test_evening_overlap_counts_only_after_22() {
        let minutes = night_minutes(
            make_datetime("2026-01-15 14:00:00"),
            make_datetime("2026-01-15 23:30:00"),
            default_window(),
        );
        assert_eq!(minutes, 90);
    }

    #[test]
    fn test_overnight_span_crossing_midnight() {
        let minutes = night_minutes(
            make_datetime("2026-01-15 23:10:00"),
            make_datetime("2026-01-16 02:30:00"),
            default_window(),
        );
        assert_eq!(minutes, 200);
    }

    #[test]
    fn test_span_ending_after_window_closes() {
        let minutes = night_minutes(
            make_datetime("2026-01-16 03:45:00"),
            make_datetime("2026-01-16 08:00:00"),
            default_window(),
        );
        assert_eq!(minutes, 75);
    }

    #[test]
    fn test_full_night_window_is_seven_hours() {
        let minutes = night_minutes(
            make_datetime("2026-01-15 20:00:00"),
            make_datetime("2026-01-16 07:00:00"),
            default_window(),
        );
        assert_eq!(minutes, 7 * 60);
    }

    #[test]
    fn test_non_wrapping_window() {
        let window = NightWindow::new(0, 6);
        let minutes = night_minutes(
            make_datetime("2026-01-15 22:00:00"),
            make_datetime("2026-01-16 02:15:00"),
            window,
        );
        assert_eq!(minutes, 135);
    }

    #[test]
    fn test_empty_or_reversed_span() {
        let t = make_datetime("2026-01-15 23:00:00");
        assert_eq!(night_minutes(t, t, default_window()), 0);
        assert_eq!(
            night_minutes(t, make_datetime("2026-01-15 22:00:00"), default_window()),
            0
        );
    }
}
