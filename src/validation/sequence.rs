//! Punch sequence state machine.
//!
//! Within one work day the first punch must be `IN`, and afterwards:
//!
//! | Last punch | May be followed by |
//! |------------|--------------------|
//! | `IN`       | `OUT`, `OUTSIDE`   |
//! | `OUTSIDE`  | `RETURN`           |
//! | `RETURN`   | `OUT`, `OUTSIDE`   |
//! | `OUT`      | nothing            |

use chrono::NaiveDateTime;

use crate::calculation::{work_date, work_day_bounds};
use crate::error::{EngineError, EngineResult};
use crate::models::PunchType;
use crate::service::PunchRepository;

/// Checks whether `next` may follow `last` within a work day.
///
/// # Example
///
/// ```
/// use punch_engine::models::PunchType;
/// use punch_engine::validation::validate_transition;
///
/// assert!(validate_transition(None, PunchType::In).is_ok());
/// assert!(validate_transition(Some(PunchType::In), PunchType::Outside).is_ok());
/// assert!(validate_transition(Some(PunchType::Outside), PunchType::Out).is_err());
/// ```
pub fn validate_transition(last: Option<PunchType>, next: PunchType) -> EngineResult<()> {
    match last {
        None if next == PunchType::In => Ok(()),
        None => Err(EngineError::InvalidSequenceStart {
            attempted: next.display_name().to_string(),
        }),
        Some(current) if current.allowed_successors().contains(&next) => Ok(()),
        Some(current) => Err(EngineError::InvalidSequenceTransition {
            current: current.display_name().to_string(),
            attempted: next.display_name().to_string(),
        }),
    }
}

/// Validates a punch against the last punch of its work day.
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    cutoff_hour: u32,
}

impl SequenceValidator {
    /// Creates a validator for the given work-day cutoff hour.
    pub fn new(cutoff_hour: u32) -> Self {
        Self { cutoff_hour }
    }

    /// Returns the last punch type of the work day at or before `timestamp`.
    pub fn last_punch_type(
        &self,
        repo: &dyn PunchRepository,
        employee_id: &str,
        timestamp: NaiveDateTime,
    ) -> EngineResult<Option<PunchType>> {
        let (start, end) = work_day_bounds(work_date(timestamp, self.cutoff_hour), self.cutoff_hour);
        let punches = repo.punches_between(employee_id, start, end)?;
        Ok(punches
            .iter()
            .filter(|p| p.timestamp <= timestamp)
            .max_by_key(|p| p.timestamp)
            .map(|p| p.punch_type))
    }

    /// Rejects `punch_type` if it may not follow the work day's last punch.
    ///
    /// # Errors
    ///
    /// - `InvalidSequenceStart` if the day has no punch yet and this is not `IN`
    /// - `InvalidSequenceTransition` for any other illegal successor
    pub fn check(
        &self,
        repo: &dyn PunchRepository,
        employee_id: &str,
        punch_type: PunchType,
        timestamp: NaiveDateTime,
    ) -> EngineResult<()> {
        let last = self.last_punch_type(repo, employee_id, timestamp)?;
        validate_transition(last, punch_type)
    }
}
