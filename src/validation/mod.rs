//! Punch validation steps.
//!
//! A submitted punch passes, in order: identity resolution, the duplicate
//! guard, the daily limit and the sequence check. Each step reads the latest
//! persisted state through the repository and rejects with a stable error code.

mod daily_limit;
mod duplicate_guard;
mod identity;
mod pipeline;
mod sequence;

pub use daily_limit::DailyLimitEnforcer;
pub use duplicate_guard::DuplicateGuard;
pub use identity::IdentityResolver;
pub use pipeline::PunchValidator;
pub use sequence::{SequenceValidator, validate_transition};
