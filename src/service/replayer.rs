//! Replays queued punches into the primary store.

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewPunch, OfflineQueueEntry};
use crate::offline::SyncHandler;
use crate::validation::{IdentityResolver, PunchValidator};

use super::repository::PunchRepository;

/// The production [`SyncHandler`].
///
/// Unresolved entries go through identity resolution first. Every entry is
/// validated again before insertion; a duplicate means the punch already
/// reached the store and counts as synced.
pub struct PunchReplayer {
    repo: Arc<dyn PunchRepository>,
    identity: IdentityResolver,
    validator: PunchValidator,
    clock: Arc<dyn Clock>,
}

impl PunchReplayer {
    /// Creates a replayer over `repo`.
    pub fn new(repo: Arc<dyn PunchRepository>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            repo,
            identity: IdentityResolver::new(config.identity.hash_secret.clone()),
            validator: PunchValidator::new(&config.punch),
            clock,
        }
    }

    /// Replays one entry.
    pub fn replay(&self, entry: &OfflineQueueEntry) -> EngineResult<()> {
        let employee_id = match &entry.employee_id {
            Some(id) => id.clone(),
            None => {
                self.identity
                    .resolve(self.repo.as_ref(), entry.card_token.as_deref(), None)?
                    .id
            }
        };

        let validation = self.validator.validate(
            self.repo.as_ref(),
            &employee_id,
            entry.punch_type,
            entry.timestamp,
            self.clock.now(),
        );
        match validation {
            Ok(()) => {}
            Err(EngineError::DuplicatePunch { .. }) => {
                debug!(
                    entry_id = entry.id,
                    employee_id = %employee_id,
                    "Queued punch already stored, treating as synced"
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let event = self.repo.insert_punch(NewPunch {
            employee_id,
            punch_type: entry.punch_type,
            timestamp: entry.timestamp,
            device_type: entry.device_type.clone(),
            note: entry.note.clone(),
            location: entry.location,
        })?;

        info!(
            entry_id = entry.id,
            employee_id = %event.employee_id,
            punch_type = %event.punch_type,
            punch_id = %event.id,
            "Queued punch replayed"
        );
        Ok(())
    }
}

impl SyncHandler for PunchReplayer {
    fn sync(&self, entry: &OfflineQueueEntry) -> Result<(), String> {
        self.replay(entry)
            .map_err(|e| format!("{}: {}", e.code(), e))
    }
}
