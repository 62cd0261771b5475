//! Offline durability.
//!
//! Punches that cannot reach the primary store are held in a bounded SQLite
//! queue and replayed by a background worker once the store is back.

mod notifier;
mod queue;
mod sync;

pub use notifier::{LogNotifier, Notifier};
pub use queue::{EnqueueOutcome, OfflineQueue, content_hash};
pub use sync::{CycleReport, SyncHandler, SyncWorker, Synchronizer};
