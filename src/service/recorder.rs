//! Punch persistence with offline fallback.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use crate::calculation::work_date;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, NewPunch, NewQueueEntry, PunchRequest, PunchResult};
use crate::offline::{EnqueueOutcome, OfflineQueue};

use super::repository::PunchRepository;

/// Persists validated punches, falling back to the offline queue when the
/// primary store cannot be reached.
pub struct PunchRecorder {
    repo: Arc<dyn PunchRepository>,
    queue: Arc<OfflineQueue>,
    cutoff_hour: u32,
}

impl PunchRecorder {
    /// Creates a recorder writing to `repo` with `queue` as fallback.
    pub fn new(repo: Arc<dyn PunchRepository>, queue: Arc<OfflineQueue>, cutoff_hour: u32) -> Self {
        Self {
            repo,
            queue,
            cutoff_hour,
        }
    }

    /// Persists a validated punch.
    ///
    /// A connectivity failure queues the punch and still succeeds with
    /// `is_offline: true`. Any other store failure is logged and surfaced
    /// as a generic `Storage` error.
    pub fn record(&self, employee: &Employee, punch: NewPunch) -> EngineResult<PunchResult> {
        let work_date = work_date(punch.timestamp, self.cutoff_hour);

        match self.repo.insert_punch(punch.clone()) {
            Ok(event) => {
                info!(
                    employee_id = %employee.id,
                    punch_type = %event.punch_type,
                    punch_id = %event.id,
                    work_date = %work_date,
                    "Punch recorded"
                );
                Ok(PunchResult {
                    success: true,
                    message: event.punch_type.recorded_message().to_string(),
                    punch: Some(event),
                    employee: Some(employee.summary()),
                    work_date,
                    is_offline: false,
                })
            }
            Err(e) if e.is_unavailable() => {
                warn!(
                    employee_id = %employee.id,
                    punch_type = %punch.punch_type,
                    error = %e,
                    "Store unreachable on insert, queueing punch"
                );
                let entry = NewQueueEntry {
                    employee_id: Some(punch.employee_id),
                    card_token: None,
                    punch_type: punch.punch_type,
                    timestamp: punch.timestamp,
                    device_type: punch.device_type,
                    location: punch.location,
                    note: punch.note,
                };
                self.enqueue(entry, Some(employee))
            }
            Err(e) => {
                error!(
                    employee_id = %employee.id,
                    punch_type = %punch.punch_type,
                    error = %e,
                    "Failed to store punch"
                );
                Err(EngineError::Storage {
                    message: "the punch could not be stored".to_string(),
                })
            }
        }
    }

    /// Queues a punch that could not get through identity resolution or
    /// validation because the store was unreachable.
    ///
    /// With a resolved employee the employee id is queued; otherwise the
    /// presented card hash (or raw token) is kept for resolution at replay.
    pub fn record_offline(
        &self,
        request: &PunchRequest,
        timestamp: NaiveDateTime,
        employee: Option<&Employee>,
    ) -> EngineResult<PunchResult> {
        let card_token = match employee {
            Some(_) => None,
            None => presented_identity(request),
        };
        let entry = NewQueueEntry {
            employee_id: employee.map(|e| e.id.clone()),
            card_token,
            punch_type: request.punch_type,
            timestamp,
            device_type: request.device_type.clone(),
            location: request.location,
            note: request.note.clone(),
        };
        self.enqueue(entry, employee)
    }

    fn enqueue(
        &self,
        entry: NewQueueEntry,
        employee: Option<&Employee>,
    ) -> EngineResult<PunchResult> {
        let work_date = work_date(entry.timestamp, self.cutoff_hour);
        let outcome = self.queue.enqueue(&entry).inspect_err(|e| {
            error!(
                punch_type = %entry.punch_type,
                error = %e,
                "Failed to queue punch offline"
            );
        })?;

        if let EnqueueOutcome::AlreadyQueued(id) = outcome {
            info!(entry_id = id, "Punch was already waiting in the offline queue");
        }

        Ok(PunchResult {
            success: true,
            message: entry.punch_type.queued_message().to_string(),
            punch: None,
            employee: employee.map(Employee::summary),
            work_date,
            is_offline: true,
        })
    }
}

fn presented_identity(request: &PunchRequest) -> Option<String> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    present(&request.card_hash).or_else(|| present(&request.card_token))
}
