//! Per-work-day punch caps.

use chrono::NaiveDateTime;

use crate::calculation::{work_date, work_day_bounds};
use crate::config::PunchRules;
use crate::error::{EngineError, EngineResult};
use crate::models::PunchType;
use crate::service::PunchRepository;

/// Enforces the maximum number of punches of each type per work day.
///
/// Types without a configured cap (by default `OUT`) are never checked.
#[derive(Debug, Clone)]
pub struct DailyLimitEnforcer {
    rules: PunchRules,
}

impl DailyLimitEnforcer {
    /// Creates an enforcer from the punch rules.
    pub fn new(rules: &PunchRules) -> Self {
        Self {
            rules: rules.clone(),
        }
    }

    /// Counts punches of `punch_type` in the work day of `timestamp` and
    /// rejects the new punch once the cap is reached.
    ///
    /// # Errors
    ///
    /// Returns `DailyLimitExceeded` with the cap and the type's display name.
    pub fn check(
        &self,
        repo: &dyn PunchRepository,
        employee_id: &str,
        punch_type: PunchType,
        timestamp: NaiveDateTime,
    ) -> EngineResult<()> {
        let Some(limit) = self.rules.daily_limit(punch_type) else {
            return Ok(());
        };

        let cutoff = self.rules.work_day_cutoff_hour;
        let (start, end) = work_day_bounds(work_date(timestamp, cutoff), cutoff);
        let count = repo
            .punches_between(employee_id, start, end)?
            .iter()
            .filter(|p| p.punch_type == punch_type)
            .count();

        if count >= limit as usize {
            return Err(EngineError::DailyLimitExceeded {
                punch_type,
                type_name: punch_type.display_name().to_string(),
                limit,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::NewPunch;
    use crate::service::InMemoryPunchRepository;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn repo_with(punches: &[(PunchType, &str)]) -> InMemoryPunchRepository {
        let repo = InMemoryPunchRepository::new();
        for (punch_type, ts) in punches {
            repo.insert_punch(NewPunch {
                employee_id: "emp_001".to_string(),
                punch_type: *punch_type,
                timestamp: make_datetime(ts),
                device_type: "card_reader".to_string(),
                note: None,
                location: None,
            })
            .unwrap();
        }
        repo
    }

    fn enforcer() -> DailyLimitEnforcer {
        DailyLimitEnforcer::new(&PunchRules::default())
    }

    #[test]
    fn test_second_clock_in_is_rejected() {
        let repo = repo_with(&[(PunchType::In, "2026-01-15 09:00:00")]);
        let err = enforcer()
            .check(&repo, "emp_001", PunchType::In, make_datetime("2026-01-15 14:00:00"))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DailyLimitExceeded);
        assert!(err.to_string().contains("clock-in"));
    }

    #[test]
    fn test_fourth_outside_is_rejected() {
        let repo = repo_with(&[
            (PunchType::Outside, "2026-01-15 10:00:00"),
            (PunchType::Outside, "2026-01-15 12:00:00"),
            (PunchType::Outside, "2026-01-15 15:00:00"),
        ]);
        let err = enforcer()
            .check(&repo, "emp_001", PunchType::Outside, make_datetime("2026-01-15 17:00:00"))
            .unwrap_err();

        match err {
            EngineError::DailyLimitExceeded { limit, type_name, .. } => {
                assert_eq!(limit, 3);
                assert_eq!(type_name, "going out");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_third_return_is_allowed() {
        let repo = repo_with(&[
            (PunchType::Return, "2026-01-15 10:10:00"),
            (PunchType::Return, "2026-01-15 12:30:00"),
        ]);
        assert!(
            enforcer()
                .check(&repo, "emp_001", PunchType::Return, make_datetime("2026-01-15 15:30:00"))
                .is_ok()
        );
    }

    #[test]
    fn test_clock_out_has_no_cap() {
        let repo = repo_with(&[
            (PunchType::Out, "2026-01-15 17:00:00"),
            (PunchType::Out, "2026-01-15 18:00:00"),
        ]);
        assert!(
            enforcer()
                .check(&repo, "emp_001", PunchType::Out, make_datetime("2026-01-15 19:00:00"))
                .is_ok()
        );
    }

    #[test]
    fn test_cap_resets_at_work_day_cutoff() {
        let repo = repo_with(&[(PunchType::In, "2026-01-15 09:00:00")]);

        // 03:00 on the next calendar day still belongs to the 15th
        assert!(
            enforcer()
                .check(&repo, "emp_001", PunchType::In, make_datetime("2026-01-16 03:00:00"))
                .is_err()
        );
        assert!(
            enforcer()
                .check(&repo, "emp_001", PunchType::In, make_datetime("2026-01-16 05:00:00"))
                .is_ok()
        );
    }
}
