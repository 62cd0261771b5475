//! Punch model and related types.
//!
//! This module defines the four punch types, the persisted [`PunchEvent`],
//! and the inbound [`PunchRequest`] accepted from readers and the API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of clock event.
///
/// Serialized in upper case (`"IN"`, `"OUT"`, `"OUTSIDE"`, `"RETURN"`).
///
/// # Example
///
/// ```
/// use punch_engine::models::PunchType;
///
/// assert_eq!(PunchType::In.allowed_successors(), &[PunchType::Out, PunchType::Outside]);
/// assert_eq!(PunchType::Outside.display_name(), "going out");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PunchType {
    /// Start of the work day.
    In,
    /// End of the work day.
    Out,
    /// Stepping out for a break.
    Outside,
    /// Coming back from a break.
    Return,
}

impl PunchType {
    /// All punch types, in declaration order.
    pub const ALL: [PunchType; 4] = [
        PunchType::In,
        PunchType::Out,
        PunchType::Outside,
        PunchType::Return,
    ];

    /// Returns the storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::In => "IN",
            PunchType::Out => "OUT",
            PunchType::Outside => "OUTSIDE",
            PunchType::Return => "RETURN",
        }
    }

    /// Parses the storage/wire representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(PunchType::In),
            "OUT" => Some(PunchType::Out),
            "OUTSIDE" => Some(PunchType::Outside),
            "RETURN" => Some(PunchType::Return),
            _ => None,
        }
    }

    /// Human-readable name used in messages and error details.
    pub fn display_name(&self) -> &'static str {
        match self {
            PunchType::In => "clock-in",
            PunchType::Out => "clock-out",
            PunchType::Outside => "going out",
            PunchType::Return => "return",
        }
    }

    /// Message returned to the caller once a punch of this type is recorded.
    pub fn recorded_message(&self) -> &'static str {
        match self {
            PunchType::In => "clock-in recorded",
            PunchType::Out => "clock-out recorded",
            PunchType::Outside => "going out recorded",
            PunchType::Return => "return recorded",
        }
    }

    /// Message returned when the punch was accepted into the offline queue.
    pub fn queued_message(&self) -> &'static str {
        match self {
            PunchType::In => "clock-in saved offline, it will be synchronized later",
            PunchType::Out => "clock-out saved offline, it will be synchronized later",
            PunchType::Outside => "going out saved offline, it will be synchronized later",
            PunchType::Return => "return saved offline, it will be synchronized later",
        }
    }

    /// The punch types that may legally follow this one within a work day.
    pub fn allowed_successors(&self) -> &'static [PunchType] {
        match self {
            PunchType::In => &[PunchType::Out, PunchType::Outside],
            PunchType::Outside => &[PunchType::Return],
            PunchType::Return => &[PunchType::Out, PunchType::Outside],
            PunchType::Out => &[],
        }
    }
}

impl std::fmt::Display for PunchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the reader was when the punch was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A persisted punch. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// Unique identifier assigned by the store.
    pub id: Uuid,
    /// The employee who punched.
    pub employee_id: String,
    /// The kind of punch.
    pub punch_type: PunchType,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    /// The kind of device that captured the punch (e.g. "card_reader").
    pub device_type: String,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional reader location.
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

/// A validated punch that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPunch {
    /// The employee who punched.
    pub employee_id: String,
    /// The kind of punch.
    pub punch_type: PunchType,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    /// The kind of device that captured the punch.
    pub device_type: String,
    /// Optional free-text note.
    pub note: Option<String>,
    /// Optional reader location.
    pub location: Option<GeoLocation>,
}

impl NewPunch {
    /// Turns the pending punch into a stored event with the given id.
    pub fn into_event(self, id: Uuid) -> PunchEvent {
        PunchEvent {
            id,
            employee_id: self.employee_id,
            punch_type: self.punch_type,
            timestamp: self.timestamp,
            device_type: self.device_type,
            note: self.note,
            location: self.location,
        }
    }
}

/// A punch submission as received from a reader or the API.
///
/// At least one of `card_token` and `card_hash` must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchRequest {
    /// Raw token read from the card (hex identifier) or a pre-computed hash.
    #[serde(default)]
    pub card_token: Option<String>,
    /// Explicit pre-computed card hash.
    #[serde(default)]
    pub card_hash: Option<String>,
    /// The kind of punch.
    pub punch_type: PunchType,
    /// The kind of device that captured the punch.
    #[serde(default = "default_device_type")]
    pub device_type: String,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Explicit timestamp for deterministic or delayed submission.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    /// Optional reader location.
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

fn default_device_type() -> String {
    "card_reader".to_string()
}

impl PunchRequest {
    /// Creates a request for a raw card token with default device type.
    pub fn from_token(card_token: impl Into<String>, punch_type: PunchType) -> Self {
        Self {
            card_token: Some(card_token.into()),
            card_hash: None,
            punch_type,
            device_type: default_device_type(),
            note: None,
            timestamp: None,
            location: None,
        }
    }

    /// Sets an explicit timestamp.
    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns true if neither a token nor a hash is present (blank strings count as absent).
    pub fn has_no_identity(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.card_token) && blank(&self.card_hash)
    }
}
