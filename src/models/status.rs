//! Lifecycle statuses for leave requests and room bookings.
//!
//! Both lifecycles start in `pending` and only ever move forward:
//!
//! ```text
//! leave:    pending -> approved | rejected
//! booking:  pending -> approved | rejected
//!           pending | approved -> cancelled
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved by a leader or admin.
    Approved,
    /// Rejected by a leader or admin.
    Rejected,
}

impl LeaveStatus {
    /// Statuses that occupy the owner's calendar and consume balance.
    pub const QUALIFYING: [LeaveStatus; 2] = [LeaveStatus::Pending, LeaveStatus::Approved];

    /// Returns true if the status blocks overlapping requests.
    pub fn is_qualifying(&self) -> bool {
        Self::QUALIFYING.contains(self)
    }

    /// Returns true if no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    /// Returns true if `self -> to` is a permitted transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
    /// assert!(!LeaveStatus::Rejected.can_transition_to(LeaveStatus::Pending));
    /// ```
    pub fn can_transition_to(&self, to: LeaveStatus) -> bool {
        matches!(
            (self, to),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
        )
    }

    /// Performs the transition or reports it as invalid.
    pub fn transition(self, to: LeaveStatus) -> EngineResult<LeaveStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(EngineError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Status of a room booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; holds the room.
    Approved,
    /// Rejected by a leader or admin.
    Rejected,
    /// Withdrawn by its owner or an admin.
    Cancelled,
}

impl BookingStatus {
    /// Only approved bookings hold a room.
    pub const HOLDS_ROOM: [BookingStatus; 1] = [BookingStatus::Approved];

    /// Returns true if no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }

    /// Returns true if `self -> to` is a permitted transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::BookingStatus;
    ///
    /// assert!(BookingStatus::Approved.can_transition_to(BookingStatus::Cancelled));
    /// assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Approved));
    /// ```
    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        matches!(
            (self, to),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Approved, BookingStatus::Cancelled)
        )
    }

    /// Performs the transition or reports it as invalid.
    pub fn transition(self, to: BookingStatus) -> EngineResult<BookingStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(EngineError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Approved => write!(f, "approved"),
            BookingStatus::Rejected => write!(f, "rejected"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_pending_moves_to_approved_or_rejected() {
        assert_eq!(
            LeaveStatus::Pending.transition(LeaveStatus::Approved).unwrap(),
            LeaveStatus::Approved
        );
        assert_eq!(
            LeaveStatus::Pending.transition(LeaveStatus::Rejected).unwrap(),
            LeaveStatus::Rejected
        );
    }

    #[test]
    fn test_leave_terminal_states_do_not_move() {
        for from in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            assert!(from.is_terminal());
            for to in [LeaveStatus::Pending, LeaveStatus::Approved, LeaveStatus::Rejected] {
                assert!(from.transition(to).is_err(), "{} -> {} allowed", from, to);
            }
        }
    }

    #[test]
    fn test_leave_pending_to_pending_is_invalid() {
        match LeaveStatus::Pending.transition(LeaveStatus::Pending) {
            Err(EngineError::InvalidTransition { from, to }) => {
                assert_eq!(from, "pending");
                assert_eq!(to, "pending");
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_leave_qualifying_statuses() {
        assert!(LeaveStatus::Pending.is_qualifying());
        assert!(LeaveStatus::Approved.is_qualifying());
        assert!(!LeaveStatus::Rejected.is_qualifying());
    }

    #[test]
    fn test_booking_cancel_from_pending_and_approved() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Approved.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_booking_never_returns_to_pending() {
        for from in [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(BookingStatus::Pending));
        }
    }

    #[test]
    fn test_booking_approved_cannot_be_rejected() {
        assert!(
            BookingStatus::Approved
                .transition(BookingStatus::Rejected)
                .is_err()
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        let status: LeaveStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, LeaveStatus::Approved);
    }
}
