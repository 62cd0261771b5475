//! Duplicate punch detection.
//!
//! A card held against the reader for a moment too long, or tapped twice,
//! produces the same punch type again within seconds. Such repeats are
//! rejected until the configured interval (default 3 minutes) has passed.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::PunchRules;
use crate::error::{EngineError, EngineResult};
use crate::models::PunchType;
use crate::service::PunchRepository;

/// Rejects a punch type repeated within the minimum interval.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    min_interval_seconds: i64,
    simulation_mode: bool,
}

impl DuplicateGuard {
    /// Creates a guard from the punch rules.
    pub fn new(rules: &PunchRules) -> Self {
        Self {
            min_interval_seconds: rules.duplicate_interval_seconds,
            simulation_mode: rules.simulation_mode,
        }
    }

    /// Checks the new punch against the nearest punch of the same type.
    ///
    /// The nearest punch may lie after `timestamp` when a back-dated punch is
    /// replayed from the offline queue; the distance is measured either way.
    ///
    /// # Arguments
    ///
    /// * `repo` - The primary store
    /// * `employee_id` - The resolved employee
    /// * `punch_type` - The type being punched
    /// * `timestamp` - When the punch happened
    /// * `now` - The current wall-clock time
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePunch` with the elapsed seconds and the configured
    /// interval when the previous punch is too recent.
    pub fn check(
        &self,
        repo: &dyn PunchRepository,
        employee_id: &str,
        punch_type: PunchType,
        timestamp: NaiveDateTime,
        now: NaiveDateTime,
    ) -> EngineResult<()> {
        let Some(previous) = repo.nearest_punch_of_type(employee_id, punch_type, timestamp)? else {
            return Ok(());
        };

        if self.simulation_mode && previous.timestamp > now && timestamp > now {
            debug!(
                employee_id = %employee_id,
                punch_type = %punch_type,
                "Simulated future punches, skipping duplicate check"
            );
            return Ok(());
        }

        let seconds_since_last = (timestamp - previous.timestamp).num_seconds().abs();
        if seconds_since_last < self.min_interval_seconds {
            return Err(EngineError::DuplicatePunch {
                punch_type,
                seconds_since_last,
                min_interval_seconds: self.min_interval_seconds,
            });
        }

        Ok(())
    }
}
