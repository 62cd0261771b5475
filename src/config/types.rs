//! Configuration types for the punch engine.
//!
//! This module contains the strongly-typed configuration structures that are
//! deserialized from the YAML configuration file. Every section falls back to
//! its defaults when omitted.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::PunchType;

/// Punch validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunchRules {
    /// Minimum seconds between two punches of the same type.
    pub duplicate_interval_seconds: i64,
    /// Punches before this hour belong to the previous work day.
    pub work_day_cutoff_hour: u32,
    /// Per-work-day caps. Types without an entry are uncapped.
    pub daily_limits: BTreeMap<PunchType, u32>,
    /// Skip the duplicate check when both punches are simulated in the future.
    pub simulation_mode: bool,
}

impl Default for PunchRules {
    fn default() -> Self {
        Self {
            duplicate_interval_seconds: 180,
            work_day_cutoff_hour: 5,
            daily_limits: BTreeMap::from([
                (PunchType::In, 1),
                (PunchType::Outside, 3),
                (PunchType::Return, 3),
            ]),
            simulation_mode: false,
        }
    }
}

impl PunchRules {
    /// The duplicate interval as a chrono duration.
    pub fn duplicate_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.duplicate_interval_seconds)
    }

    /// Returns the configured cap for a punch type, if any.
    pub fn daily_limit(&self, punch_type: PunchType) -> Option<u32> {
        self.daily_limits.get(&punch_type).copied()
    }
}

/// Card identity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Secret appended to the token before hashing.
    pub hash_secret: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            hash_secret: "punch-engine-development-secret".to_string(),
        }
    }
}

/// Work-time calculation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkTimeRules {
    /// Hour the night window opens (inclusive).
    pub night_start_hour: u32,
    /// Hour the night window closes (exclusive).
    pub night_end_hour: u32,
    /// Worked minutes per day before overtime starts.
    pub overtime_threshold_minutes: i64,
    /// Overtime minutes counted as normal overtime; the rest is late overtime.
    pub normal_overtime_limit_minutes: i64,
    /// Elapsed minutes from which a break is assumed if none was punched.
    pub implied_break_after_minutes: i64,
    /// Length of the assumed break.
    pub implied_break_minutes: i64,
    /// Rounding unit for a single day.
    pub daily_rounding_minutes: i64,
    /// Rounding unit for monthly totals.
    pub monthly_rounding_minutes: i64,
}

impl Default for WorkTimeRules {
    fn default() -> Self {
        Self {
            night_start_hour: 22,
            night_end_hour: 5,
            overtime_threshold_minutes: 480,
            normal_overtime_limit_minutes: 120,
            implied_break_after_minutes: 360,
            implied_break_minutes: 60,
            daily_rounding_minutes: 1,
            monthly_rounding_minutes: 30,
        }
    }
}

/// Wage multipliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WageRules {
    /// Hourly rate for employees without an override.
    pub default_hourly_rate: Decimal,
    /// Multiplier for first-tier overtime.
    pub overtime_normal_multiplier: Decimal,
    /// Multiplier for second-tier overtime.
    pub overtime_late_multiplier: Decimal,
    /// Additional fraction of the rate paid for night minutes.
    pub night_premium_rate: Decimal,
}

impl Default for WageRules {
    fn default() -> Self {
        Self {
            default_hourly_rate: Decimal::new(1200, 0),
            overtime_normal_multiplier: Decimal::new(125, 2),
            overtime_late_multiplier: Decimal::new(150, 2),
            night_premium_rate: Decimal::new(25, 2),
        }
    }
}

/// Offline queue and sync loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineQueueConfig {
    /// SQLite file holding queued punches.
    pub database_path: PathBuf,
    /// Maximum number of queued entries; the oldest is evicted beyond it.
    pub capacity: usize,
    /// Entries with this many failures are no longer returned as pending.
    pub max_retries: u32,
    /// Entries older than this are purged.
    pub retention_days: i64,
    /// Seconds between sync cycles.
    pub sync_interval_seconds: u64,
    /// Maximum entries handled per cycle.
    pub batch_size: usize,
    /// An alert fires when a cycle has more failures than this.
    pub failure_alert_threshold: usize,
    /// Minimum seconds between two alerts.
    pub alert_cooldown_seconds: i64,
    /// Notification channel for alerts.
    pub alert_channel: String,
    /// Seconds between expiry purges.
    pub purge_interval_seconds: i64,
    /// Seconds to wait for the sync task on shutdown.
    pub shutdown_timeout_seconds: u64,
}

impl Default for OfflineQueueConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/offline_queue.db"),
            capacity: 1000,
            max_retries: 5,
            retention_days: 7,
            sync_interval_seconds: 30,
            batch_size: 50,
            failure_alert_threshold: 5,
            alert_cooldown_seconds: 3600,
            alert_channel: "timeclock-alerts".to_string(),
            purge_interval_seconds: 3600,
            shutdown_timeout_seconds: 5,
        }
    }
}

impl OfflineQueueConfig {
    /// Time between sync cycles.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }

    /// Bounded wait for the sync task on shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Age beyond which entries are purged.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days)
    }

    /// Minimum time between alerts.
    pub fn alert_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.alert_cooldown_seconds)
    }

    /// Minimum time between expiry purges.
    pub fn purge_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.purge_interval_seconds)
    }
}

/// The complete engine configuration.
///
/// # Example
///
/// ```
/// use punch_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.punch.duplicate_interval_seconds, 180);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Punch validation settings.
    pub punch: PunchRules,
    /// Card identity settings.
    pub identity: IdentityConfig,
    /// Work-time calculation rules.
    pub work_time: WorkTimeRules,
    /// Wage multipliers.
    pub wage: WageRules,
    /// Offline queue settings.
    pub offline_queue: OfflineQueueConfig,
}

impl EngineConfig {
    /// Checks every value once; the engine assumes a validated configuration.
    pub fn validate(&self) -> EngineResult<()> {
        let punch = &self.punch;
        ensure(
            punch.duplicate_interval_seconds >= 0,
            "punch.duplicate_interval_seconds",
            "must not be negative",
        )?;
        ensure(
            punch.work_day_cutoff_hour < 24,
            "punch.work_day_cutoff_hour",
            "must be between 0 and 23",
        )?;
        if let Some((punch_type, _)) = punch.daily_limits.iter().find(|(_, limit)| **limit == 0) {
            return Err(invalid(
                &format!("punch.daily_limits.{}", punch_type),
                "must be at least 1",
            ));
        }

        ensure(
            !self.identity.hash_secret.is_empty(),
            "identity.hash_secret",
            "must not be empty",
        )?;

        let work = &self.work_time;
        ensure(
            work.night_start_hour < 24 && work.night_end_hour < 24,
            "work_time.night_start_hour",
            "night window hours must be between 0 and 23",
        )?;
        ensure(
            work.night_start_hour != work.night_end_hour,
            "work_time.night_end_hour",
            "night window must not be empty",
        )?;
        ensure(
            work.overtime_threshold_minutes > 0,
            "work_time.overtime_threshold_minutes",
            "must be positive",
        )?;
        ensure(
            work.normal_overtime_limit_minutes >= 0,
            "work_time.normal_overtime_limit_minutes",
            "must not be negative",
        )?;
        ensure(
            work.implied_break_minutes >= 0 && work.implied_break_after_minutes >= 0,
            "work_time.implied_break_minutes",
            "must not be negative",
        )?;
        ensure(
            work.daily_rounding_minutes > 0,
            "work_time.daily_rounding_minutes",
            "must be positive",
        )?;
        ensure(
            work.monthly_rounding_minutes >= work.daily_rounding_minutes,
            "work_time.monthly_rounding_minutes",
            "must not be finer than the daily rounding",
        )?;

        let wage = &self.wage;
        ensure(
            wage.default_hourly_rate >= Decimal::ZERO,
            "wage.default_hourly_rate",
            "must not be negative",
        )?;
        ensure(
            wage.overtime_normal_multiplier >= Decimal::ONE
                && wage.overtime_late_multiplier >= wage.overtime_normal_multiplier,
            "wage.overtime_late_multiplier",
            "overtime multipliers must be at least 1 and non-decreasing",
        )?;
        ensure(
            wage.night_premium_rate >= Decimal::ZERO,
            "wage.night_premium_rate",
            "must not be negative",
        )?;

        let queue = &self.offline_queue;
        ensure(queue.capacity > 0, "offline_queue.capacity", "must be positive")?;
        ensure(queue.max_retries > 0, "offline_queue.max_retries", "must be positive")?;
        ensure(queue.batch_size > 0, "offline_queue.batch_size", "must be positive")?;
        ensure(
            queue.retention_days > 0,
            "offline_queue.retention_days",
            "must be positive",
        )?;
        ensure(
            queue.sync_interval_seconds > 0,
            "offline_queue.sync_interval_seconds",
            "must be positive",
        )?;
        ensure(
            queue.alert_cooldown_seconds >= 0 && queue.purge_interval_seconds >= 0,
            "offline_queue.alert_cooldown_seconds",
            "must not be negative",
        )?;

        Ok(())
    }
}

fn ensure(condition: bool, field: &str, message: &str) -> EngineResult<()> {
    if condition {
        Ok(())
    } else {
        Err(invalid(field, message))
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
