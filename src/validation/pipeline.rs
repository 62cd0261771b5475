//! The validation steps that follow identity resolution.

use chrono::NaiveDateTime;

use crate::config::PunchRules;
use crate::error::EngineResult;
use crate::models::PunchType;
use crate::service::PunchRepository;

use super::daily_limit::DailyLimitEnforcer;
use super::duplicate_guard::DuplicateGuard;
use super::sequence::SequenceValidator;

/// Runs the duplicate guard, the daily limit and the sequence check, in
/// that order, stopping at the first rejection.
#[derive(Debug, Clone)]
pub struct PunchValidator {
    duplicate_guard: DuplicateGuard,
    daily_limit: DailyLimitEnforcer,
    sequence: SequenceValidator,
}

impl PunchValidator {
    /// Creates the validator from the punch rules.
    pub fn new(rules: &PunchRules) -> Self {
        Self {
            duplicate_guard: DuplicateGuard::new(rules),
            daily_limit: DailyLimitEnforcer::new(rules),
            sequence: SequenceValidator::new(rules.work_day_cutoff_hour),
        }
    }

    /// Validates a punch for an already-resolved employee.
    pub fn validate(
        &self,
        repo: &dyn PunchRepository,
        employee_id: &str,
        punch_type: PunchType,
        timestamp: NaiveDateTime,
        now: NaiveDateTime,
    ) -> EngineResult<()> {
        self.duplicate_guard
            .check(repo, employee_id, punch_type, timestamp, now)?;
        self.daily_limit
            .check(repo, employee_id, punch_type, timestamp)?;
        self.sequence.check(repo, employee_id, punch_type, timestamp)
    }
}
