//! HTTP request handlers for the punch engine API.
//!
//! This module contains the handler functions for all API endpoints. The
//! engine is synchronous, so every handler runs its work on the blocking pool.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::PunchRequest;

use super::request::{DailySummaryQuery, MonthlySummaryQuery};
use super::response::ApiErrorResponse;
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/punches", post(submit_punch_handler))
        .route("/employees/:id/daily-summary", get(daily_summary_handler))
        .route("/employees/:id/monthly-summary", get(monthly_summary_handler))
        .with_state(state)
}

/// Handler for POST /punches.
///
/// Returns 201 with the punch result, or 202 when the punch was accepted
/// into the offline queue.
async fn submit_punch_handler(
    State(state): State<AppState>,
    payload: Result<Json<PunchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let message = match rejection {
                JsonRejection::JsonDataError(err) => err.body_text(),
                JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
                JsonRejection::MissingJsonContentType(_) => {
                    "Content-Type must be application/json".to_string()
                }
                _ => "Failed to parse request body".to_string(),
            };
            warn!(
                correlation_id = %correlation_id,
                error = %message,
                "Malformed punch request"
            );
            return ApiErrorResponse::malformed_json(message).into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        punch_type = %request.punch_type,
        device_type = %request.device_type,
        "Processing punch"
    );

    let service = state.punches();
    let start_time = Instant::now();
    match run_blocking(move || service.submit(&request)).await {
        Ok(result) => {
            let status = if result.is_offline {
                StatusCode::ACCEPTED
            } else {
                StatusCode::CREATED
            };
            info!(
                correlation_id = %correlation_id,
                employee_id = result.employee.as_ref().map(|e| e.id.as_str()).unwrap_or("-"),
                work_date = %result.work_date,
                is_offline = result.is_offline,
                duration_us = start_time.elapsed().as_micros(),
                "Punch accepted"
            );
            json_response(status, &result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id/daily-summary?date=YYYY-MM-DD.
async fn daily_summary_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(query): Query<DailySummaryQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing daily summary request"
    );

    let service = state.summaries();
    let date = query.date.unwrap_or_default();
    match run_blocking(move || service.daily_summary(&employee_id, &date)).await {
        Ok(summary) => json_response(StatusCode::OK, &summary),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id/monthly-summary?month=YYYY-MM.
async fn monthly_summary_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(query): Query<MonthlySummaryQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing monthly summary request"
    );

    let service = state.summaries();
    let month = query.month.unwrap_or_default();
    match run_blocking(move || service.monthly_summary(&employee_id, &month)).await {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %report.employee_id,
                days_worked = report.summary.days_worked,
                total_pay = %report.wage.total_pay,
                "Monthly summary completed"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn run_blocking<T, F>(work: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::Internal {
            message: format!("blocking task failed: {}", e),
        })?
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    if err.is_rejection() {
        warn!(
            correlation_id = %correlation_id,
            code = %err.code(),
            error = %err,
            "Request rejected"
        );
    } else {
        error!(
            correlation_id = %correlation_id,
            code = %err.code(),
            error = %err,
            "Request failed"
        );
    }
    ApiErrorResponse::from(err).into_response()
}
