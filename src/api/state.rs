//! Application state for the punch engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::offline::OfflineQueue;
use crate::service::{PunchRepository, PunchService, SummaryService};

/// Shared application state.
///
/// Holds the punch pipeline and the summary service. Both share the one
/// repository and, for punches, the one offline queue of the instance.
#[derive(Clone)]
pub struct AppState {
    punches: Arc<PunchService>,
    summaries: Arc<SummaryService>,
}

impl AppState {
    /// Wires the services from a validated configuration.
    pub fn new(
        repo: Arc<dyn PunchRepository>,
        queue: Arc<OfflineQueue>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let punches = PunchService::new(repo.clone(), queue, clock, &config);
        let summaries = SummaryService::new(repo, Arc::new(config));
        Self {
            punches: Arc::new(punches),
            summaries: Arc::new(summaries),
        }
    }

    /// Returns the punch pipeline.
    pub fn punches(&self) -> Arc<PunchService> {
        Arc::clone(&self.punches)
    }

    /// Returns the summary service.
    pub fn summaries(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summaries)
    }
}
