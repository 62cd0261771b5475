//! Daily work summary calculation.
//!
//! Turns the punches of one employee and one work day into work, break,
//! night and overtime minutes.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::WorkTimeRules;
use crate::models::{PunchEvent, PunchType, WorkSummary};

use super::night_time::{NightWindow, night_minutes};
use super::overtime::split_overtime;
use super::rounding::round_minutes;

/// Builds the work summary for one work day.
///
/// Session construction:
/// - the first `IN` starts the session and the last `OUT` ends it,
/// - each `OUTSIDE` followed by a `RETURN` inside the session is a break,
/// - with no punched break and at least `implied_break_after_minutes`
///   elapsed, `implied_break_minutes` are assumed,
/// - night minutes are the overlap of the session with the night window,
/// - worked time beyond the threshold is split into the overtime tiers.
///
/// Every duration is rounded to `daily_rounding_minutes`. A day without a
/// matching `IN`/`OUT` pair yields a zeroed summary with
/// `is_complete = false`.
///
/// # Arguments
///
/// * `work_date` - The work date the punches belong to
/// * `punches` - The punches of that work day, in any order
/// * `rules` - The work-time rules
///
/// # Example
///
/// ```
/// use punch_engine::calculation::calculate_daily_summary;
/// use punch_engine::config::WorkTimeRules;
/// use punch_engine::models::{PunchEvent, PunchType};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use uuid::Uuid;
///
/// let punch = |punch_type, ts: &str| PunchEvent {
///     id: Uuid::new_v4(),
///     employee_id: "emp_001".to_string(),
///     punch_type,
///     timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
///     device_type: "card_reader".to_string(),
///     note: None,
///     location: None,
/// };
///
/// let punches = vec![
///     punch(PunchType::In, "2026-01-15 09:00:00"),
///     punch(PunchType::Outside, "2026-01-15 12:00:00"),
///     punch(PunchType::Return, "2026-01-15 13:00:00"),
///     punch(PunchType::Out, "2026-01-15 18:00:00"),
/// ];
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let summary = calculate_daily_summary(date, &punches, &WorkTimeRules::default());
/// assert_eq!(summary.work_minutes, 480);
/// assert_eq!(summary.break_minutes, 60);
/// assert_eq!(summary.overtime_normal_minutes, 0);
/// ```
pub fn calculate_daily_summary(
    work_date: NaiveDate,
    punches: &[PunchEvent],
    rules: &WorkTimeRules,
) -> WorkSummary {
    let mut sorted: Vec<&PunchEvent> = punches.iter().collect();
    sorted.sort_by_key(|p| p.timestamp);

    let clock_in = sorted
        .iter()
        .find(|p| p.punch_type == PunchType::In)
        .map(|p| p.timestamp);
    let clock_out = sorted
        .iter()
        .rev()
        .find(|p| p.punch_type == PunchType::Out)
        .map(|p| p.timestamp);

    let (start, end) = match (clock_in, clock_out) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            debug!(
                work_date = %work_date,
                punches = punches.len(),
                "No matching IN/OUT pair, day is incomplete"
            );
            return WorkSummary {
                clock_in,
                clock_out,
                ..WorkSummary::incomplete(work_date)
            };
        }
    };

    let elapsed = (end - start).num_minutes();
    let explicit_break = explicit_break_minutes(&sorted, start, end);

    let (break_minutes, break_implied) = match explicit_break {
        Some(minutes) => (minutes, false),
        None if elapsed >= rules.implied_break_after_minutes => {
            (rules.implied_break_minutes.min(elapsed), true)
        }
        None => (0, false),
    };

    let work_minutes = (elapsed - break_minutes).max(0);
    let night = night_minutes(start, end, NightWindow::from_rules(rules));
    let overtime = split_overtime(work_minutes, rules);
    let unit = rules.daily_rounding_minutes;

    WorkSummary {
        work_date,
        clock_in: Some(start),
        clock_out: Some(end),
        work_minutes: round_minutes(work_minutes, unit),
        break_minutes: round_minutes(break_minutes, unit),
        break_implied,
        night_minutes: round_minutes(night, unit),
        overtime_normal_minutes: round_minutes(overtime.normal_minutes, unit),
        overtime_late_minutes: round_minutes(overtime.late_minutes, unit),
        is_complete: true,
    }
}

/// Sums `OUTSIDE` → `RETURN` spans inside the session.
///
/// Returns `None` when no complete pair was punched. An `OUTSIDE` without a
/// following `RETURN` is ignored.
fn explicit_break_minutes(
    sorted: &[&PunchEvent],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Option<i64> {
    let mut total = None;
    let mut outside_at: Option<NaiveDateTime> = None;

    for punch in sorted
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp <= end)
    {
        match punch.punch_type {
            PunchType::Outside => {
                if outside_at.is_none() {
                    outside_at = Some(punch.timestamp);
                }
            }
            PunchType::Return => {
                if let Some(left) = outside_at.take() {
                    *total.get_or_insert(0) += (punch.timestamp - left).num_minutes();
                }
            }
            PunchType::In | PunchType::Out => {}
        }
    }

    total
}
