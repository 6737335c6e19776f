//! Leave allowance accounting.
//!
//! A user's allowance is a yearly quota of requests. Every pending or
//! approved request consumes one unit; rejected requests give it back.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ValidationRule};
use crate::models::LeaveRequest;

/// Quota used when no quota is configured for a user.
pub const DEFAULT_ANNUAL_QUOTA: u32 = 12;

/// Snapshot of a user's allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The configured quota.
    pub quota: u32,
    /// Requests currently consuming allowance.
    pub used: u32,
    /// Unclamped remainder; zero or below blocks new requests.
    pub raw_remaining: i64,
    /// Remainder for display, never below zero.
    pub remaining: u32,
}

impl LeaveBalance {
    /// Returns true if a new request may be submitted.
    pub fn allows_submission(&self) -> bool {
        self.raw_remaining > 0
    }
}

/// Derives remaining allowance from a quota and usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveBalanceCounter {
    quota: u32,
}

impl LeaveBalanceCounter {
    /// Creates a counter for the given quota.
    pub fn new(quota: u32) -> Self {
        Self { quota }
    }

    /// Creates a counter from an optional configured quota, falling back to
    /// [`DEFAULT_ANNUAL_QUOTA`].
    pub fn from_configured(quota: Option<u32>) -> Self {
        Self::new(quota.unwrap_or(DEFAULT_ANNUAL_QUOTA))
    }

    /// The quota in effect.
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// `quota - used`, which may be zero or negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::balance::LeaveBalanceCounter;
    ///
    /// let counter = LeaveBalanceCounter::new(12);
    /// assert_eq!(counter.remaining(12), 0);
    /// assert_eq!(counter.remaining(11), 1);
    /// assert_eq!(counter.remaining(14), -2);
    /// ```
    pub fn remaining(&self, used: u32) -> i64 {
        i64::from(self.quota) - i64::from(used)
    }

    /// Number of `owner`'s requests that consume allowance.
    pub fn used_count(requests: &[LeaveRequest], owner: &str) -> u32 {
        let used = requests
            .iter()
            .filter(|request| request.user_id == owner && request.status.is_qualifying())
            .count();
        u32::try_from(used).unwrap_or(u32::MAX)
    }

    /// The full balance of `owner` given their requests.
    pub fn balance(&self, requests: &[LeaveRequest], owner: &str) -> LeaveBalance {
        let used = Self::used_count(requests, owner);
        let raw_remaining = self.remaining(used);
        LeaveBalance {
            quota: self.quota,
            used,
            raw_remaining,
            remaining: u32::try_from(raw_remaining.max(0)).unwrap_or(u32::MAX),
        }
    }

    /// Rejects a submission when the raw remainder is zero or below.
    pub fn ensure_available(&self, used: u32) -> EngineResult<()> {
        if self.remaining(used) > 0 {
            Ok(())
        } else {
            Err(EngineError::validation(
                ValidationRule::BalanceExhausted,
                format!(
                    "You have reached your maximum leave requests for this year ({} times)",
                    self.quota
                ),
            ))
        }
    }
}

impl Default for LeaveBalanceCounter {
    fn default() -> Self {
        Self::new(DEFAULT_ANNUAL_QUOTA)
    }
}
