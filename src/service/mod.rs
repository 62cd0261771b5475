//! Punch processing services.
//!
//! [`PunchService`] runs submissions through validation and recording,
//! [`PunchReplayer`] feeds the offline queue back into the store, and
//! [`SummaryService`] answers work-time queries. All of them reach the
//! primary store through [`PunchRepository`].

mod punch_service;
mod recorder;
mod replayer;
mod repository;
mod summary;

pub use punch_service::PunchService;
pub use recorder::PunchRecorder;
pub use replayer::PunchReplayer;
pub use repository::{
    InMemoryPunchRepository, PunchRepository, RepositoryError, RepositoryResult,
};
pub use summary::SummaryService;
