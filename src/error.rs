//! Error types for the workforce engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a leave, booking or attendance action can hit. Local
//! checks (validation, conflicts, state transitions) are kept apart from
//! failures of the record store so callers can surface them differently.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The rule a rejected submission violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// A required field was absent or blank.
    MissingField,
    /// The start of a range lies after its end.
    StartAfterEnd,
    /// A booking whose end is not strictly after its start.
    EmptyTimeRange,
    /// A booking that starts and ends on different calendar days.
    CrossDaySpan,
    /// The user has no leave allowance left.
    BalanceExhausted,
    /// The leave type and custom type reference do not agree.
    InvalidLeaveType,
    /// A calendar month outside 1-12, or a year chrono cannot represent.
    InvalidMonth,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationRule::MissingField => "missing_field",
            ValidationRule::StartAfterEnd => "start_after_end",
            ValidationRule::EmptyTimeRange => "empty_time_range",
            ValidationRule::CrossDaySpan => "cross_day_span",
            ValidationRule::BalanceExhausted => "balance_exhausted",
            ValidationRule::InvalidLeaveType => "invalid_leave_type",
            ValidationRule::InvalidMonth => "invalid_month",
        };
        f.write_str(name)
    }
}

/// Which kind of overlap blocked a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The owner already holds an active leave request on one of the days.
    LeaveDates,
    /// The room already has an approved booking in the time range.
    RoomTime,
}

impl ConflictKind {
    /// The message shown to the end user for this conflict.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConflictKind::LeaveDates => "You already have a leave request for this date range",
            ConflictKind::RoomTime => {
                "This room is already booked for the selected time. Please choose a different time or room."
            }
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

/// The main error type for the workforce engine.
///
/// # Example
///
/// ```
/// use workforce_engine::error::{EngineError, ValidationRule};
///
/// let error = EngineError::validation(
///     ValidationRule::StartAfterEnd,
///     "Start date must be before or equal to end date",
/// );
/// assert_eq!(
///     error.to_string(),
///     "Validation failed (start_after_end): Start date must be before or equal to end date"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A submission broke a local rule and was rejected before any write.
    #[error("Validation failed ({rule}): {message}")]
    Validation {
        /// The violated rule.
        rule: ValidationRule,
        /// A description naming the rule for the end user.
        message: String,
    },

    /// The candidate range overlaps an existing qualifying record.
    #[error("{kind} (conflicts with '{conflicting_id}')")]
    Conflict {
        /// What kind of overlap was found.
        kind: ConflictKind,
        /// Identifier of the first conflicting record.
        conflicting_id: String,
    },

    /// A status change that the lifecycle does not allow.
    #[error("Cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// The acting user may not perform this action.
    #[error("Not permitted: {action}")]
    Forbidden {
        /// The action that was refused.
        action: String,
    },

    /// The addressed record does not exist.
    #[error("{record} '{id}' not found")]
    NotFound {
        /// The kind of record.
        record: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A fetch, insert, update or delete against the record store failed.
    #[error("Remote operation '{operation}' failed: {message}")]
    RemoteOperation {
        /// The operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(rule: ValidationRule, message: impl Into<String>) -> Self {
        EngineError::Validation {
            rule,
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Forbidden`] error.
    pub fn forbidden(action: impl Into<String>) -> Self {
        EngineError::Forbidden {
            action: action.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
