//! Configuration loading and management for the punch engine.
//!
//! This module loads the typed engine configuration from a YAML file,
//! validating it once at startup.
//!
//! # Example
//!
//! ```no_run
//! use punch_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/engine.yaml").unwrap().into_config();
//! println!("Duplicate interval: {}s", config.punch.duplicate_interval_seconds);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, IdentityConfig, OfflineQueueConfig, PunchRules, WageRules, WorkTimeRules,
};
