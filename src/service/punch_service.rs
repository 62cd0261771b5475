//! Punch submission pipeline.
//!
//! identity → duplicate guard → daily limit → sequence → recorder.
//! When the store becomes unreachable at any step the punch is diverted to
//! the offline queue instead of failing.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewPunch, PunchRequest, PunchResult};
use crate::offline::OfflineQueue;
use crate::validation::{IdentityResolver, PunchValidator};

use super::recorder::PunchRecorder;
use super::repository::PunchRepository;

/// Accepts punch submissions and runs them through validation and recording.
pub struct PunchService {
    repo: Arc<dyn PunchRepository>,
    identity: IdentityResolver,
    validator: PunchValidator,
    recorder: PunchRecorder,
    clock: Arc<dyn Clock>,
}

impl PunchService {
    /// Wires the pipeline from a validated configuration.
    pub fn new(
        repo: Arc<dyn PunchRepository>,
        queue: Arc<OfflineQueue>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            identity: IdentityResolver::new(config.identity.hash_secret.clone()),
            validator: PunchValidator::new(&config.punch),
            recorder: PunchRecorder::new(repo.clone(), queue, config.punch.work_day_cutoff_hour),
            repo,
            clock,
        }
    }

    /// Processes one punch submission.
    ///
    /// # Errors
    ///
    /// Rejections carry their stable code (`INVALID_REQUEST_NO_ID`,
    /// `EMPLOYEE_NOT_FOUND`, `INACTIVE_EMPLOYEE`, `DUPLICATE_PUNCH`,
    /// `DAILY_LIMIT_EXCEEDED`, `INVALID_SEQUENCE_START`,
    /// `INVALID_SEQUENCE_TRANSITION`). Unexpected failures are logged and
    /// returned as `Storage`.
    pub fn submit(&self, request: &PunchRequest) -> EngineResult<PunchResult> {
        if request.has_no_identity() {
            return Err(self.reject(EngineError::InvalidRequestNoId, None, request));
        }

        let now = self.clock.now();
        let timestamp = request.timestamp.unwrap_or(now);

        let employee = match self.identity.resolve(
            self.repo.as_ref(),
            request.card_token.as_deref(),
            request.card_hash.as_deref(),
        ) {
            Ok(employee) => employee,
            Err(e) if e.is_connectivity() => {
                warn!(
                    punch_type = %request.punch_type,
                    error = %e,
                    "Store unreachable during identity resolution, queueing punch"
                );
                return self.recorder.record_offline(request, timestamp, None);
            }
            Err(e) => return Err(self.reject(e, None, request)),
        };

        match self.validator.validate(
            self.repo.as_ref(),
            &employee.id,
            request.punch_type,
            timestamp,
            now,
        ) {
            Ok(()) => {}
            Err(e) if e.is_connectivity() => {
                warn!(
                    employee_id = %employee.id,
                    punch_type = %request.punch_type,
                    error = %e,
                    "Store unreachable during validation, queueing punch"
                );
                return self
                    .recorder
                    .record_offline(request, timestamp, Some(&employee));
            }
            Err(e) => return Err(self.reject(e, Some(&employee.id), request)),
        }

        let punch = NewPunch {
            employee_id: employee.id.clone(),
            punch_type: request.punch_type,
            timestamp,
            device_type: request.device_type.clone(),
            note: request.note.clone(),
            location: request.location,
        };
        let result = self.recorder.record(&employee, punch)?;

        if result.is_offline {
            info!(employee_id = %employee.id, "Punch accepted offline");
        }
        Ok(result)
    }

    fn reject(
        &self,
        err: EngineError,
        employee_id: Option<&str>,
        request: &PunchRequest,
    ) -> EngineError {
        if err.is_rejection() {
            warn!(
                employee_id = employee_id.unwrap_or("-"),
                punch_type = %request.punch_type,
                code = %err.code(),
                reason = %err,
                "Punch rejected"
            );
            return err;
        }

        error!(
            employee_id = employee_id.unwrap_or("-"),
            punch_type = %request.punch_type,
            error = %err,
            "Punch processing failed"
        );
        EngineError::Storage {
            message: "the punch could not be processed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ErrorCode;
    use crate::models::{Employee, PunchType};
    use crate::service::InMemoryPunchRepository;
    use chrono::NaiveDateTime;

    const SECRET: &str = "test-secret";
    const CARD: &str = "04a1b2c3";

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    struct Fixture {
        service: PunchService,
        repo: Arc<InMemoryPunchRepository>,
        queue: Arc<OfflineQueue>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let mut config = EngineConfig::default();
        config.identity.hash_secret = SECRET.to_string();

        let resolver = IdentityResolver::new(SECRET);
        let repo = Arc::new(InMemoryPunchRepository::with_employees([
            Employee {
                id: "emp_001".to_string(),
                name: "Hanako".to_string(),
                card_hash: resolver.bin_hash(CARD).unwrap(),
                is_active: true,
                hourly_rate: None,
            },
            Employee {
                id: "emp_002".to_string(),
                name: "Taro".to_string(),
                card_hash: resolver.str_hash("RETIRED"),
                is_active: false,
                hourly_rate: None,
            },
        ]));
        let clock = Arc::new(ManualClock::new(make_datetime("2026-01-15 09:00:00")));
        let queue = Arc::new(
            OfflineQueue::open_in_memory(config.offline_queue.clone(), clock.clone()).unwrap(),
        );
        let service = PunchService::new(repo.clone(), queue.clone(), clock.clone(), &config);
        Fixture {
            service,
            repo,
            queue,
            clock,
        }
    }

    fn punch(f: &Fixture, punch_type: PunchType) -> EngineResult<PunchResult> {
        f.service.submit(&PunchRequest::from_token(CARD, punch_type))
    }

    #[test]
    fn test_clock_in_uses_current_time() {
        let f = fixture();
        let result = punch(&f, PunchType::In).unwrap();

        assert_eq!(result.message, "clock-in recorded");
        let event = result.punch.unwrap();
        assert_eq!(event.timestamp, make_datetime("2026-01-15 09:00:00"));
        assert_eq!(event.employee_id, "emp_001");
    }

    #[test]
    fn test_full_day() {
        let f = fixture();
        punch(&f, PunchType::In).unwrap();
        f.clock.set(make_datetime("2026-01-15 12:00:00"));
        punch(&f, PunchType::Outside).unwrap();
        f.clock.set(make_datetime("2026-01-15 13:00:00"));
        punch(&f, PunchType::Return).unwrap();
        f.clock.set(make_datetime("2026-01-15 18:00:00"));
        let result = punch(&f, PunchType::Out).unwrap();

        assert_eq!(result.message, "clock-out recorded");
        assert_eq!(f.repo.punch_count(), 4);
    }

    #[test]
    fn test_double_tap_is_duplicate() {
        let f = fixture();
        punch(&f, PunchType::In).unwrap();
        f.clock.advance(chrono::Duration::seconds(20));

        let err = punch(&f, PunchType::In).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicatePunch);
        assert_eq!(f.repo.punch_count(), 1);
    }

    #[test]
    fn test_rejections_carry_codes() {
        let f = fixture();

        let err = f
            .service
            .submit(&PunchRequest {
                card_token: None,
                ..PunchRequest::from_token(CARD, PunchType::In)
            })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequestNoId);

        let err = f
            .service
            .submit(&PunchRequest::from_token("ffff0000", PunchType::In))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmployeeNotFound);

        let err = f
            .service
            .submit(&PunchRequest::from_token("RETIRED", PunchType::In))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InactiveEmployee);

        let err = punch(&f, PunchType::Out).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSequenceStart);
    }

    #[test]
    fn test_explicit_timestamp_is_respected() {
        let f = fixture();
        let request =
            PunchRequest::from_token(CARD, PunchType::In).at(make_datetime("2026-01-14 23:30:00"));

        let result = f.service.submit(&request).unwrap();
        assert_eq!(result.work_date.to_string(), "2026-01-14");
    }

    #[test]
    fn test_unreachable_store_queues_unresolved_token() {
        let f = fixture();
        f.repo.set_unreachable(true);

        let result = punch(&f, PunchType::In).unwrap();
        assert!(result.is_offline);
        assert!(result.employee.is_none());
        assert_eq!(result.message, PunchType::In.queued_message());

        let pending = f.queue.pending(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].card_token.as_deref(), Some(CARD));
    }

    #[test]
    fn test_store_failure_is_not_queued() {
        let f = fixture();
        f.repo.set_failing(true);

        let err = punch(&f, PunchType::In).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert!(f.queue.is_empty().unwrap());
    }
}
