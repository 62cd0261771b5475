//! Daily and monthly work summaries for one employee.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};

use crate::calculation::{
    WageInput, aggregate_monthly, calculate_daily_summary, calculate_wage, hourly_rate_for,
    work_date, work_day_bounds,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, MonthlyReport, PunchEvent, WorkSummary};

use super::repository::PunchRepository;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds work summaries from persisted punches.
pub struct SummaryService {
    repo: Arc<dyn PunchRepository>,
    config: Arc<EngineConfig>,
}

impl SummaryService {
    /// Creates a summary service over `repo`.
    pub fn new(repo: Arc<dyn PunchRepository>, config: Arc<EngineConfig>) -> Self {
        Self { repo, config }
    }

    /// Summary of one work day.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The employee to summarize
    /// * `date` - The work date as `YYYY-MM-DD`
    ///
    /// # Errors
    ///
    /// `InvalidDateFormat` for an unparseable date, `EmployeeIdNotFound` for
    /// an unknown employee.
    pub fn daily_summary(&self, employee_id: &str, date: &str) -> EngineResult<WorkSummary> {
        let work_date = parse_date(date)?;
        self.employee(employee_id)?;

        let cutoff = self.config.punch.work_day_cutoff_hour;
        let (start, end) = work_day_bounds(work_date, cutoff);
        let punches = self.repo.punches_between(employee_id, start, end)?;

        Ok(calculate_daily_summary(
            work_date,
            &punches,
            &self.config.work_time,
        ))
    }

    /// Totals and pay for one calendar month of work dates.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The employee to summarize
    /// * `month` - The month as `YYYY-MM`
    ///
    /// # Errors
    ///
    /// `InvalidDateFormat` for an unparseable month, `EmployeeIdNotFound` for
    /// an unknown employee.
    pub fn monthly_summary(&self, employee_id: &str, month: &str) -> EngineResult<MonthlyReport> {
        let first = parse_month(month)?;
        let employee = self.employee(employee_id)?;

        let cutoff = self.config.punch.work_day_cutoff_hour;
        let next_month = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| invalid_month(month))?;
        let (start, _) = work_day_bounds(first, cutoff);
        let (end, _) = work_day_bounds(next_month, cutoff);
        let punches = self.repo.punches_between(employee_id, start, end)?;

        let mut by_day: BTreeMap<NaiveDate, Vec<PunchEvent>> = BTreeMap::new();
        for punch in punches {
            by_day
                .entry(work_date(punch.timestamp, cutoff))
                .or_default()
                .push(punch);
        }

        let rules = &self.config.work_time;
        let days: Vec<WorkSummary> = by_day
            .iter()
            .map(|(date, punches)| calculate_daily_summary(*date, punches, rules))
            .collect();

        let summary = aggregate_monthly(first.year(), first.month(), &days, rules);
        let wage = calculate_wage(
            WageInput::from(&summary),
            hourly_rate_for(&employee, &self.config.wage),
            &self.config.wage,
        );

        Ok(MonthlyReport {
            employee_id: employee.id,
            summary,
            wage,
            days,
        })
    }

    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.repo
            .find_employee(employee_id)?
            .ok_or_else(|| EngineError::EmployeeIdNotFound {
                employee_id: employee_id.to_string(),
            })
    }
}

fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| EngineError::InvalidDateFormat {
        value: value.to_string(),
        expected: "YYYY-MM-DD".to_string(),
    })
}

fn parse_month(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
        .map_err(|_| invalid_month(value))
}

fn invalid_month(value: &str) -> EngineError {
    EngineError::InvalidDateFormat {
        value: value.to_string(),
        expected: "YYYY-MM".to_string(),
    }
}
