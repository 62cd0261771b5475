//! Work-time and wage summary models.
//!
//! These are the outputs of the time and wage engine in
//! [`crate::calculation`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Work-time totals for one employee and one work day.
///
/// All durations are in minutes and already rounded to the daily granularity.
///
/// # Example
///
/// ```
/// use punch_engine::models::WorkSummary;
/// use chrono::NaiveDate;
///
/// let summary = WorkSummary::incomplete(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// assert!(!summary.is_complete);
/// assert_eq!(summary.work_minutes, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    /// The work date (after the cutoff-hour rollback).
    pub work_date: NaiveDate,
    /// First `IN` of the day.
    pub clock_in: Option<NaiveDateTime>,
    /// Last `OUT` of the day.
    pub clock_out: Option<NaiveDateTime>,
    /// Worked minutes (elapsed minus breaks).
    pub work_minutes: i64,
    /// Break minutes (explicit or implied).
    pub break_minutes: i64,
    /// True if the break was assumed rather than punched.
    pub break_implied: bool,
    /// Minutes of the span inside the night window.
    pub night_minutes: i64,
    /// Overtime minutes in the first tier.
    pub overtime_normal_minutes: i64,
    /// Overtime minutes beyond the first tier.
    pub overtime_late_minutes: i64,
    /// False if the day has no matching `IN`/`OUT` pair.
    pub is_complete: bool,
}

impl WorkSummary {
    /// A zeroed summary for a day without a matching `IN`/`OUT` pair.
    pub fn incomplete(work_date: NaiveDate) -> Self {
        Self {
            work_date,
            clock_in: None,
            clock_out: None,
            work_minutes: 0,
            break_minutes: 0,
            break_implied: false,
            night_minutes: 0,
            overtime_normal_minutes: 0,
            overtime_late_minutes: 0,
            is_complete: false,
        }
    }

    /// Total overtime across both tiers.
    pub fn overtime_minutes(&self) -> i64 {
        self.overtime_normal_minutes + self.overtime_late_minutes
    }
}

/// Totals for one employee across a calendar month of work days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Number of complete work days.
    pub days_worked: u32,
    /// Number of days with punches but no matching `IN`/`OUT` pair.
    pub incomplete_days: u32,
    /// Worked minutes, rounded to the monthly granularity.
    pub work_minutes: i64,
    /// Break minutes, rounded to the monthly granularity.
    pub break_minutes: i64,
    /// Night minutes, rounded to the monthly granularity.
    pub night_minutes: i64,
    /// First-tier overtime minutes, rounded to the monthly granularity.
    pub overtime_normal_minutes: i64,
    /// Second-tier overtime minutes, rounded to the monthly granularity.
    pub overtime_late_minutes: i64,
}

/// Pay derived from a set of work-time totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageBreakdown {
    /// The hourly rate used.
    pub hourly_rate: Decimal,
    /// Pay for non-overtime minutes at the base rate.
    pub regular_pay: Decimal,
    /// Pay for first-tier overtime minutes.
    pub overtime_normal_pay: Decimal,
    /// Pay for second-tier overtime minutes.
    pub overtime_late_pay: Decimal,
    /// Additional premium for night minutes.
    pub night_premium_pay: Decimal,
    /// Sum of all components.
    pub total_pay: Decimal,
}

/// Monthly totals together with the pay they produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// The employee the report belongs to.
    pub employee_id: String,
    /// Month totals.
    pub summary: MonthlySummary,
    /// Pay for the month.
    pub wage: WageBreakdown,
    /// The daily summaries the totals were built from, by work date.
    pub days: Vec<WorkSummary>,
}
