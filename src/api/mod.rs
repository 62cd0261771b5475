//! HTTP API module for the punch engine.
//!
//! This module provides the REST endpoints for submitting punches and
//! querying daily and monthly work summaries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DailySummaryQuery, MonthlySummaryQuery};
pub use response::{ApiError, ApiErrorResponse, status_for};
pub use state::AppState;
