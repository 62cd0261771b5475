//! The structured outcome of a punch submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EmployeeSummary, PunchEvent};

/// Result of a successful punch submission.
///
/// When the primary store was unreachable the punch is held in the offline
/// queue: `is_offline` is true and `punch` is `None` because nothing has been
/// persisted yet. `employee` is `None` only when identity could not be
/// resolved before the store became unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchResult {
    /// Always true; failures are reported as errors.
    pub success: bool,
    /// Human-readable message, e.g. "clock-in recorded".
    pub message: String,
    /// The persisted punch.
    pub punch: Option<PunchEvent>,
    /// Minimal employee summary.
    pub employee: Option<EmployeeSummary>,
    /// The work date the punch is attributed to.
    pub work_date: NaiveDate,
    /// True if the punch was queued for later synchronization.
    #[serde(default)]
    pub is_offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_result_serializes_flag() {
        let result = PunchResult {
            success: true,
            message: "clock-in saved offline, it will be synchronized later".to_string(),
            punch: None,
            employee: None,
            work_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            is_offline: true,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_offline"], true);
        assert_eq!(json["work_date"], "2026-01-15");
        assert!(json["punch"].is_null());
    }
}
