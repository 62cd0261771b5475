//! Wage calculation from work-time totals.
//!
//! ## Rate Structure
//!
//! - Regular minutes: base hourly rate
//! - First-tier overtime: base rate × `overtime_normal_multiplier` (default 125%)
//! - Second-tier overtime: base rate × `overtime_late_multiplier` (default 150%)
//! - Night minutes: an additional base rate × `night_premium_rate` (default 25%)
//!   on top of whatever the minute is already paid

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::WageRules;
use crate::models::{Employee, MonthlySummary, WageBreakdown, WorkSummary};

/// The minute totals a wage is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WageInput {
    /// Worked minutes, overtime included.
    pub work_minutes: i64,
    /// Minutes inside the night window.
    pub night_minutes: i64,
    /// First-tier overtime minutes.
    pub overtime_normal_minutes: i64,
    /// Second-tier overtime minutes.
    pub overtime_late_minutes: i64,
}

impl From<&WorkSummary> for WageInput {
    fn from(summary: &WorkSummary) -> Self {
        Self {
            work_minutes: summary.work_minutes,
            night_minutes: summary.night_minutes,
            overtime_normal_minutes: summary.overtime_normal_minutes,
            overtime_late_minutes: summary.overtime_late_minutes,
        }
    }
}

impl From<&MonthlySummary> for WageInput {
    fn from(summary: &MonthlySummary) -> Self {
        Self {
            work_minutes: summary.work_minutes,
            night_minutes: summary.night_minutes,
            overtime_normal_minutes: summary.overtime_normal_minutes,
            overtime_late_minutes: summary.overtime_late_minutes,
        }
    }
}

/// Returns the employee's rate override, or the configured default.
pub fn hourly_rate_for(employee: &Employee, rules: &WageRules) -> Decimal {
    employee.hourly_rate.unwrap_or(rules.default_hourly_rate)
}

/// Calculates pay for a set of minute totals.
///
/// Each component is rounded to 2 decimal places (midpoint away from zero)
/// and the total is the sum of the rounded components.
///
/// # Example
///
/// ```
/// use punch_engine::calculation::{calculate_wage, WageInput};
/// use punch_engine::config::WageRules;
/// use rust_decimal::Decimal;
///
/// let input = WageInput {
///     work_minutes: 600,
///     night_minutes: 0,
///     overtime_normal_minutes: 120,
///     overtime_late_minutes: 0,
/// };
/// let wage = calculate_wage(input, Decimal::new(1200, 0), &WageRules::default());
/// assert_eq!(wage.regular_pay, Decimal::new(9600, 0));
/// assert_eq!(wage.overtime_normal_pay, Decimal::new(3000, 0));
/// assert_eq!(wage.total_pay, Decimal::new(12600, 0));
/// ```
pub fn calculate_wage(input: WageInput, hourly_rate: Decimal, rules: &WageRules) -> WageBreakdown {
    let regular_minutes =
        (input.work_minutes - input.overtime_normal_minutes - input.overtime_late_minutes).max(0);

    let regular_pay = pay_for(regular_minutes, hourly_rate);
    let overtime_normal_pay = pay_for(
        input.overtime_normal_minutes,
        hourly_rate * rules.overtime_normal_multiplier,
    );
    let overtime_late_pay = pay_for(
        input.overtime_late_minutes,
        hourly_rate * rules.overtime_late_multiplier,
    );
    let night_premium_pay = pay_for(input.night_minutes, hourly_rate * rules.night_premium_rate);

    WageBreakdown {
        hourly_rate,
        regular_pay,
        overtime_normal_pay,
        overtime_late_pay,
        night_premium_pay,
        total_pay: regular_pay + overtime_normal_pay + overtime_late_pay + night_premium_pay,
    }
}

fn pay_for(minutes: i64, rate: Decimal) -> Decimal {
    let hours = Decimal::from(minutes.max(0)) / Decimal::from(60);
    (hours * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
