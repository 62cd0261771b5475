//! Core data models for the punch engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod offline_entry;
mod punch;
mod punch_result;
mod work_summary;

pub use employee::{Employee, EmployeeSummary};
pub use offline_entry::{NewQueueEntry, OfflineQueueEntry};
pub use punch::{GeoLocation, NewPunch, PunchEvent, PunchRequest, PunchType};
pub use punch_result::PunchResult;
pub use work_summary::{MonthlyReport, MonthlySummary, WageBreakdown, WorkSummary};
