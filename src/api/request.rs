//! Request types for the punch engine API.
//!
//! Punch submissions deserialize straight into
//! [`PunchRequest`](crate::models::PunchRequest); this module holds the query
//! parameters of the summary endpoints.

use serde::{Deserialize, Serialize};

/// Query string of `GET /employees/:id/daily-summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySummaryQuery {
    /// The work date as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
}

/// Query string of `GET /employees/:id/monthly-summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlySummaryQuery {
    /// The month as `YYYY-MM`.
    #[serde(default)]
    pub month: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_deserializes_to_none() {
        let query: DailySummaryQuery = serde_json::from_str("{}").unwrap();
        assert!(query.date.is_none());

        let query: MonthlySummaryQuery = serde_json::from_str(r#"{"month": "2026-01"}"#).unwrap();
        assert_eq!(query.month.as_deref(), Some("2026-01"));
    }
}
