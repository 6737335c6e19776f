//! Leave request model and related types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ValidationRule};

use super::LeaveStatus;

/// The kind of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Annual leave.
    Annual,
    /// Sick leave.
    Sick,
    /// Personal leave.
    Personal,
    /// Unpaid leave.
    Unpaid,
    /// An organization-defined leave type, referenced by `custom_type_id`.
    Custom,
}

impl LeaveType {
    /// The standard (non-custom) leave types.
    pub const STANDARD: [LeaveType; 4] = [
        LeaveType::Annual,
        LeaveType::Sick,
        LeaveType::Personal,
        LeaveType::Unpaid,
    ];

    /// Maps a leave type selection to a type and custom type reference.
    ///
    /// Standard tags map to themselves and the `custom` tag maps to
    /// [`LeaveType::Custom`] with no reference yet. Any other value is taken
    /// to be the identifier of a custom leave type.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::LeaveType;
    ///
    /// assert_eq!(LeaveType::from_selection("sick"), (LeaveType::Sick, None));
    /// assert_eq!(LeaveType::from_selection("custom"), (LeaveType::Custom, None));
    /// assert_eq!(
    ///     LeaveType::from_selection("lt_42"),
    ///     (LeaveType::Custom, Some("lt_42".to_string()))
    /// );
    /// ```
    pub fn from_selection(value: &str) -> (LeaveType, Option<String>) {
        let value = value.trim();
        if value == LeaveType::Custom.to_string() {
            return (LeaveType::Custom, None);
        }
        match LeaveType::STANDARD.iter().find(|t| t.to_string() == value) {
            Some(standard) => (*standard, None),
            None => (LeaveType::Custom, Some(value.to_string())),
        }
    }

    /// Checks that the custom type reference agrees with the type.
    pub fn validate_reference(&self, custom_type_id: Option<&str>) -> EngineResult<()> {
        let has_reference = custom_type_id.is_some_and(|id| !id.trim().is_empty());
        match (self, has_reference) {
            (LeaveType::Custom, false) => Err(EngineError::validation(
                ValidationRule::InvalidLeaveType,
                "Custom leave requires a custom leave type",
            )),
            (LeaveType::Custom, true) | (_, false) => Ok(()),
            (_, true) => Err(EngineError::validation(
                ValidationRule::InvalidLeaveType,
                format!("{} leave cannot reference a custom leave type", self),
            )),
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Annual => write!(f, "annual"),
            LeaveType::Sick => write!(f, "sick"),
            LeaveType::Personal => write!(f, "personal"),
            LeaveType::Unpaid => write!(f, "unpaid"),
            LeaveType::Custom => write!(f, "custom"),
        }
    }
}

/// A request for leave over an inclusive range of calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: String,
    /// The user requesting leave.
    pub user_id: String,
    /// The kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Reference to a custom leave type when `leave_type` is custom.
    #[serde(default)]
    pub custom_type_id: Option<String>,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Optional free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Current status.
    pub status: LeaveStatus,
    /// The user asked to approve the request, replaced by the decider.
    pub approver_id: String,
    /// Reason given when the request was rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was approved or rejected.
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Number of calendar days covered, counting both endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::{LeaveRequest, LeaveStatus, LeaveType};
    /// use chrono::{NaiveDate, Utc};
    ///
    /// let request = LeaveRequest {
    ///     id: "leave_001".to_string(),
    ///     user_id: "user_001".to_string(),
    ///     leave_type: LeaveType::Annual,
    ///     custom_type_id: None,
    ///     start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
    ///     reason: None,
    ///     status: LeaveStatus::Pending,
    ///     approver_id: "leader_001".to_string(),
    ///     rejection_reason: None,
    ///     created_at: Utc::now(),
    ///     decided_at: None,
    /// };
    /// assert_eq!(request.day_count(), 3);
    /// ```
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
