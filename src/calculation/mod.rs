//! Time and wage calculation.
//!
//! This module contains the pure functions behind the summaries: work-day
//! assignment with a configurable cutoff hour, minute rounding, night-window
//! overlap, the two-tier overtime split, daily and monthly aggregation, and
//! wage calculation from the resulting minute totals.

mod daily_summary;
mod monthly_summary;
mod night_time;
mod overtime;
mod rounding;
mod wage;
mod work_day;

pub use daily_summary::calculate_daily_summary;
pub use monthly_summary::aggregate_monthly;
pub use night_time::{NightWindow, night_minutes};
pub use overtime::{OvertimeSplit, split_overtime};
pub use rounding::round_minutes;
pub use wage::{WageInput, calculate_wage, hourly_rate_for};
pub use work_day::{work_date, work_day_bounds};
