//! Configuration loading and management for the workforce engine.
//!
//! This module loads leave, attendance and booking policies from YAML
//! files, with defaults for anything left out.
//!
//! # Example
//!
//! ```no_run
//! use workforce_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Default quota: {}", config.config().leave.default_annual_quota);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AttendancePolicy, BookingPolicy, EngineConfig, LeavePolicy};
