//! Punch-Clock Engine for employee time recording
//!
//! This crate records card punches (IN, OUT, OUTSIDE, RETURN), validates them
//! against duplicate, daily-limit and sequence rules, buffers them in a local
//! offline queue while the central store is unreachable, and derives daily
//! and monthly work summaries with wage breakdowns.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod offline;
pub mod reader;
pub mod service;
pub mod validation;
