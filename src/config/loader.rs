//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading policy
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::attendance::AttendanceAggregator;
use crate::balance::LeaveBalanceCounter;
use crate::error::{EngineError, EngineResult};

use super::types::{AttendancePolicy, BookingPolicy, EngineConfig, LeavePolicy};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── leave.yaml        # Default and per-user leave quotas
/// ├── attendance.yaml   # Presence windows and workday limit
/// └── rooms.yaml        # Booking approval policy
/// ```
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Quota for alice: {}", loader.quota_for("alice"));
/// # Ok::<(), workforce_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing or contains invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let leave = Self::load_yaml::<LeavePolicy>(&path.join("leave.yaml"))?;
        let attendance = Self::load_yaml::<AttendancePolicy>(&path.join("attendance.yaml"))?;
        let booking = Self::load_yaml::<BookingPolicy>(&path.join("rooms.yaml"))?;

        Ok(Self {
            config: EngineConfig::new(leave, attendance, booking),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the leave quota for a user.
    ///
    /// Users without an explicit entry get the default quota.
    pub fn quota_for(&self, user_id: &str) -> u32 {
        let leave = &self.config.leave;
        match leave.quotas.get(user_id) {
            Some(quota) => *quota,
            None => {
                debug!(user_id, quota = leave.default_annual_quota, "Using default leave quota");
                leave.default_annual_quota
            }
        }
    }

    /// A balance counter for a user's configured quota.
    pub fn balance_counter_for(&self, user_id: &str) -> LeaveBalanceCounter {
        LeaveBalanceCounter::new(self.quota_for(user_id))
    }

    /// An aggregator on the local calendar with the configured workday limit.
    pub fn attendance_aggregator(&self) -> AttendanceAggregator<chrono::Local> {
        AttendanceAggregator::local()
            .with_max_workday_hours(self.config.attendance.max_workday_hours)
    }

    /// Trailing windows for presence ratios.
    pub fn presence_windows(&self) -> &[u32] {
        &self.config.attendance.presence_windows_days
    }

    /// Whether new bookings start approved.
    pub fn auto_approve_bookings(&self) -> bool {
        self.config.booking.auto_approve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config().leave.default_annual_quota, 12);
        assert_eq!(loader.presence_windows(), &[7, 30]);
        assert_eq!(loader.config().attendance.max_workday_hours, 24);
        assert!(loader.auto_approve_bookings());
    }

    #[test]
    fn test_configured_quota_overrides_default() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.quota_for("hr_manager"), 20);
    }

    #[test]
    fn test_unknown_user_falls_back_to_default_quota() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.quota_for("someone_new"), 12);
        assert_eq!(loader.balance_counter_for("someone_new").quota(), 12);
    }

    #[test]
    fn test_default_loader_without_files() {
        let loader = ConfigLoader::default();
        assert_eq!(loader.quota_for("anyone"), 12);
        assert_eq!(loader.presence_windows(), &[7, 30]);
        assert!(loader.auto_approve_bookings());
    }

    #[test]
    fn test_from_config_uses_given_policy() {
        let mut quotas = HashMap::new();
        quotas.insert("alice".to_string(), 3);
        let config = EngineConfig::new(
            LeavePolicy {
                default_annual_quota: 5,
                quotas,
            },
            AttendancePolicy::default(),
            BookingPolicy {
                auto_approve: false,
            },
        );

        let loader = ConfigLoader::from_config(config);
        assert_eq!(loader.quota_for("alice"), 3);
        assert_eq!(loader.quota_for("bob"), 5);
        assert!(!loader.auto_approve_bookings());
    }

    #[test]
    fn test_partial_yaml_uses_field_defaults() {
        let policy: AttendancePolicy = serde_yaml::from_str("max_workday_hours: 16").unwrap();
        assert_eq!(policy.max_workday_hours, 16);
        assert_eq!(policy.presence_windows_days, vec![7, 30]);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("leave.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = std::env::temp_dir().join(format!("workforce-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("leave.yaml"), "default_annual_quota: [not, a, number]").unwrap();

        let result = ConfigLoader::load(&dir);
        fs::remove_dir_all(&dir).unwrap();

        match result {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.ends_with("leave.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
