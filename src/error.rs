//! Error types for the punch engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Every rejection a caller can act on carries a stable [`ErrorCode`] so the
//! collaborator layer branches on a closed set of kinds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PunchType;
use crate::service::RepositoryError;

/// Stable error codes surfaced to the collaborator layer.
///
/// # Example
///
/// ```
/// use punch_engine::error::ErrorCode;
///
/// assert_eq!(ErrorCode::DuplicatePunch.as_str(), "DUPLICATE_PUNCH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Neither a card token nor a card hash was supplied.
    InvalidRequestNoId,
    /// No employee matches the card.
    EmployeeNotFound,
    /// The card matches an employee who is disabled.
    InactiveEmployee,
    /// Same punch type submitted again inside the duplicate interval.
    DuplicatePunch,
    /// The per-work-day cap for the punch type is reached.
    DailyLimitExceeded,
    /// The first punch of the work day is not `IN`.
    InvalidSequenceStart,
    /// The punch type may not follow the previous punch.
    InvalidSequenceTransition,
    /// A summary was requested for an unknown employee id.
    EmployeeIdNotFound,
    /// A date or month parameter could not be parsed.
    InvalidDateFormat,
    /// Configuration could not be loaded or is invalid.
    ConfigError,
    /// A storage backend failed unexpectedly.
    StorageError,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequestNoId => "INVALID_REQUEST_NO_ID",
            ErrorCode::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            ErrorCode::InactiveEmployee => "INACTIVE_EMPLOYEE",
            ErrorCode::DuplicatePunch => "DUPLICATE_PUNCH",
            ErrorCode::DailyLimitExceeded => "DAILY_LIMIT_EXCEEDED",
            ErrorCode::InvalidSequenceStart => "INVALID_SEQUENCE_START",
            ErrorCode::InvalidSequenceTransition => "INVALID_SEQUENCE_TRANSITION",
            ErrorCode::EmployeeIdNotFound => "EMPLOYEE_ID_NOT_FOUND",
            ErrorCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for the punch engine.
///
/// # Example
///
/// ```
/// use punch_engine::error::{EngineError, ErrorCode};
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// assert_eq!(error.code(), ErrorCode::ConfigError);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request carried neither a card token nor a card hash.
    #[error("A card token or card hash is required")]
    InvalidRequestNoId,

    /// No employee is registered for the presented card.
    #[error("No employee is registered for this card")]
    EmployeeNotFound,

    /// The card belongs to a disabled employee.
    #[error("Employee '{employee_id}' is inactive")]
    InactiveEmployee {
        /// The matched employee.
        employee_id: String,
    },

    /// The same punch type was submitted inside the duplicate interval.
    #[error(
        "Duplicate {punch_type} punch: previous one was {seconds_since_last}s ago (minimum {min_interval_seconds}s)"
    )]
    DuplicatePunch {
        /// The rejected punch type.
        punch_type: PunchType,
        /// Seconds between the previous punch of this type and the new one.
        seconds_since_last: i64,
        /// The configured minimum interval.
        min_interval_seconds: i64,
    },

    /// The per-work-day cap for the punch type was reached.
    #[error("Daily limit reached: {type_name} is allowed at most {limit} time(s) per work day")]
    DailyLimitExceeded {
        /// The rejected punch type.
        punch_type: PunchType,
        /// Human-readable name of the punch type.
        type_name: String,
        /// The configured cap.
        limit: u32,
    },

    /// The first punch of the work day was not `IN`.
    #[error("The first punch of a work day must be clock-in, got {attempted}")]
    InvalidSequenceStart {
        /// Human-readable name of the attempted punch type.
        attempted: String,
    },

    /// The punch type may not follow the previous punch.
    #[error("Cannot record {attempted} after {current}")]
    InvalidSequenceTransition {
        /// Human-readable name of the last recorded punch type.
        current: String,
        /// Human-readable name of the attempted punch type.
        attempted: String,
    },

    /// A summary was requested for an unknown employee id.
    #[error("Employee id not found: {employee_id}")]
    EmployeeIdNotFound {
        /// The id that was looked up.
        employee_id: String,
    },

    /// A date or month parameter could not be parsed.
    #[error("Invalid date format '{value}', expected {expected}")]
    InvalidDateFormat {
        /// The rejected input.
        value: String,
        /// The expected layout.
        expected: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// The primary store failed for a reason other than connectivity.
    #[error("Storage error: {message}")]
    Storage {
        /// Backend-provided description.
        message: String,
    },

    /// The primary store returned an error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The embedded offline queue failed.
    #[error("Offline queue error: {0}")]
    QueueStorage(#[from] rusqlite::Error),

    /// An unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::InvalidRequestNoId => ErrorCode::InvalidRequestNoId,
            EngineError::EmployeeNotFound => ErrorCode::EmployeeNotFound,
            EngineError::InactiveEmployee { .. } => ErrorCode::InactiveEmployee,
            EngineError::DuplicatePunch { .. } => ErrorCode::DuplicatePunch,
            EngineError::DailyLimitExceeded { .. } => ErrorCode::DailyLimitExceeded,
            EngineError::InvalidSequenceStart { .. } => ErrorCode::InvalidSequenceStart,
            EngineError::InvalidSequenceTransition { .. } => ErrorCode::InvalidSequenceTransition,
            EngineError::EmployeeIdNotFound { .. } => ErrorCode::EmployeeIdNotFound,
            EngineError::InvalidDateFormat { .. } => ErrorCode::InvalidDateFormat,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ErrorCode::ConfigError,
            EngineError::Storage { .. }
            | EngineError::Repository(_)
            | EngineError::QueueStorage(_) => ErrorCode::StorageError,
            EngineError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Returns true if the primary store could not be reached.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, EngineError::Repository(e) if e.is_unavailable())
    }

    /// Returns true for rejections caused by the punch itself
    /// (validation and identity), as opposed to infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::ConfigError | ErrorCode::StorageError | ErrorCode::InternalError
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
