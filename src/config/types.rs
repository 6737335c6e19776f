//! Configuration types for the workforce engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use serde::Deserialize;

use crate::attendance::DEFAULT_MAX_WORKDAY_HOURS;
use crate::balance::DEFAULT_ANNUAL_QUOTA;

fn default_annual_quota() -> u32 {
    DEFAULT_ANNUAL_QUOTA
}

fn default_presence_windows() -> Vec<u32> {
    vec![7, 30]
}

fn default_max_workday_hours() -> u32 {
    DEFAULT_MAX_WORKDAY_HOURS as u32
}

fn default_auto_approve() -> bool {
    true
}

/// Leave allowance policy, from `leave.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeavePolicy {
    /// Quota for users without an entry in `quotas`.
    #[serde(default = "default_annual_quota")]
    pub default_annual_quota: u32,
    /// Per-user quota overrides, keyed by user id.
    #[serde(default)]
    pub quotas: HashMap<String, u32>,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            default_annual_quota: DEFAULT_ANNUAL_QUOTA,
            quotas: HashMap::new(),
        }
    }
}

/// Attendance metric policy, from `attendance.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendancePolicy {
    /// Trailing windows, in days, for presence ratios.
    #[serde(default = "default_presence_windows")]
    pub presence_windows_days: Vec<u32>,
    /// Longest check-in to check-out gap counted as work.
    #[serde(default = "default_max_workday_hours")]
    pub max_workday_hours: u32,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            presence_windows_days: default_presence_windows(),
            max_workday_hours: default_max_workday_hours(),
        }
    }
}

/// Room booking policy, from `rooms.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingPolicy {
    /// Whether new bookings start approved instead of pending.
    #[serde(default = "default_auto_approve")]
    pub auto_approve: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            auto_approve: default_auto_approve(),
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Leave allowance policy.
    pub leave: LeavePolicy,
    /// Attendance metric policy.
    pub attendance: AttendancePolicy,
    /// Room booking policy.
    pub booking: BookingPolicy,
}

impl EngineConfig {
    /// Creates a configuration from its component parts.
    pub fn new(leave: LeavePolicy, attendance: AttendancePolicy, booking: BookingPolicy) -> Self {
        Self {
            leave,
            attendance,
            booking,
        }
    }
}
