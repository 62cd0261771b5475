//! Response types for the punch engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine error codes to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorCode};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for a body that is not a valid punch request.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::malformed_json(message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

/// Returns the HTTP status for an error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequestNoId | ErrorCode::InvalidDateFormat => StatusCode::BAD_REQUEST,
        ErrorCode::EmployeeNotFound | ErrorCode::EmployeeIdNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InactiveEmployee => StatusCode::FORBIDDEN,
        ErrorCode::DuplicatePunch
        | ErrorCode::DailyLimitExceeded
        | ErrorCode::InvalidSequenceStart
        | ErrorCode::InvalidSequenceTransition => StatusCode::CONFLICT,
        ErrorCode::ConfigError | ErrorCode::StorageError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error.code();
        let status = status_for(code);

        if !error.is_rejection() {
            return ApiErrorResponse {
                status,
                error: ApiError::new(code.as_str(), "An internal error occurred"),
            };
        }

        let api_error = match &error {
            EngineError::DuplicatePunch {
                seconds_since_last,
                min_interval_seconds,
                ..
            } => ApiError::with_details(
                code.as_str(),
                error.to_string(),
                format!(
                    "Wait {} more second(s) before punching again",
                    (min_interval_seconds - seconds_since_last).max(1)
                ),
            ),
            EngineError::DailyLimitExceeded { type_name, limit, .. } => ApiError::with_details(
                code.as_str(),
                error.to_string(),
                format!("{} limit per work day: {}", type_name, limit),
            ),
            EngineError::InvalidSequenceTransition { current, .. } => ApiError::with_details(
                code.as_str(),
                error.to_string(),
                format!("The last punch of the work day was {}", current),
            ),
            _ => ApiError::new(code.as_str(), error.to_string()),
        };

        ApiErrorResponse {
            status,
            error: api_error,
        }
    }
}
