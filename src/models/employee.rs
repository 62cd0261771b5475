//! Employee model.
//!
//! Employees are owned by the admin subsystem; the punch engine only reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee who can punch with a proximity card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The stored card hash (BIN or STR scheme, hex encoded).
    pub card_hash: String,
    /// Disabled employees are rejected at identity resolution.
    pub is_active: bool,
    /// Optional override for the configured default hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

impl Employee {
    /// Returns the minimal view attached to punch results.
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The minimal employee view returned with a punch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
}
