//! Offline queue entry model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{GeoLocation, PunchType};

/// A punch waiting in the offline queue.
///
/// Exactly one of `employee_id` and `card_token` is normally set: the
/// employee id when identity was resolved before the store went away, the
/// raw token (or pre-computed hash) otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineQueueEntry {
    /// Row id in the queue store.
    pub id: i64,
    /// Resolved employee, if known.
    pub employee_id: Option<String>,
    /// Raw card token or card hash, if identity was not resolved.
    pub card_token: Option<String>,
    /// The kind of punch.
    pub punch_type: PunchType,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    /// The kind of device that captured the punch.
    pub device_type: String,
    /// Optional reader location.
    pub location: Option<GeoLocation>,
    /// Optional free-text note.
    pub note: Option<String>,
    /// When the entry was queued.
    pub created_at: NaiveDateTime,
    /// Number of failed sync attempts.
    pub retry_count: u32,
    /// Time of the last failed sync attempt.
    pub last_retry_at: Option<NaiveDateTime>,
    /// Error message of the last failed sync attempt.
    pub last_error: Option<String>,
    /// Uniqueness key derived from the reference and timestamp.
    pub content_hash: String,
}

/// The data needed to queue a punch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueEntry {
    /// Resolved employee, if known.
    pub employee_id: Option<String>,
    /// Raw card token or card hash, if identity was not resolved.
    pub card_token: Option<String>,
    /// The kind of punch.
    pub punch_type: PunchType,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    /// The kind of device that captured the punch.
    pub device_type: String,
    /// Optional reader location.
    pub location: Option<GeoLocation>,
    /// Optional free-text note.
    pub note: Option<String>,
}

impl NewQueueEntry {
    /// The value hashed together with the timestamp to form the content hash.
    pub fn reference(&self) -> &str {
        self.employee_id
            .as_deref()
            .or(self.card_token.as_deref())
            .unwrap_or_default()
    }
}
