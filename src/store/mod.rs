//! Record store abstraction.
//!
//! Services fetch the records they need through [`RecordStore`], hand the
//! fetched collections to the pure functions in [`crate::interval`],
//! [`crate::attendance`] and [`crate::balance`], then write the result back.
//!
//! There is no transaction spanning the fetch and the write. Two concurrent
//! submissions can both pass the conflict check and both be stored.

mod memory;

pub use memory::InMemoryStore;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::EngineError;
use crate::models::{
    AttendanceEvent, BookingStatus, LeaveRequest, LeaveStatus, Notification, RoomBooking,
};

/// Errors raised by a record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with the given identifier exists.
    #[error("No {table} record with id '{id}'")]
    NotFound {
        /// Table that was searched.
        table: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A record with the given identifier already exists.
    #[error("Duplicate {table} record '{id}'")]
    Duplicate {
        /// Table written to.
        table: &'static str,
        /// Identifier already taken.
        id: String,
    },

    /// The backend could not serve the operation.
    #[error("Record store unavailable during {operation}: {message}")]
    Unavailable {
        /// The operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { table, id } => EngineError::NotFound {
                record: table.to_string(),
                id,
            },
            StoreError::Duplicate { table, .. } => EngineError::RemoteOperation {
                operation: format!("insert {}", table),
                message: error.to_string(),
            },
            StoreError::Unavailable { operation, message } => {
                EngineError::RemoteOperation { operation, message }
            }
        }
    }
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Predicate for fetching leave requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveQuery {
    /// Only requests owned by this user.
    pub user_id: Option<String>,
    /// Only requests owned by one of these users.
    pub user_ids: Option<Vec<String>>,
    /// Only requests in one of these statuses; empty means any.
    pub statuses: Vec<LeaveStatus>,
    /// Leave out the request with this identifier.
    pub exclude_id: Option<String>,
}

impl LeaveQuery {
    /// Requests owned by `user_id`.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Requests owned by any of `user_ids`.
    pub fn for_users(user_ids: &[String]) -> Self {
        Self {
            user_ids: Some(user_ids.to_vec()),
            ..Self::default()
        }
    }

    /// Restricts the query to the given statuses.
    pub fn with_statuses(mut self, statuses: &[LeaveStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Leaves out the request with this identifier.
    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Returns true if `request` satisfies every set condition.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.user_id.as_ref().is_none_or(|id| *id == request.user_id)
            && self
                .user_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&request.user_id))
            && (self.statuses.is_empty() || self.statuses.contains(&request.status))
            && self.exclude_id.as_ref().is_none_or(|id| *id != request.id)
    }
}

/// Predicate for fetching room bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingQuery {
    /// Only bookings of this room.
    pub room_id: Option<String>,
    /// Only bookings on this day.
    pub date: Option<NaiveDate>,
    /// Only bookings in one of these statuses; empty means any.
    pub statuses: Vec<BookingStatus>,
    /// Leave out the booking with this identifier.
    pub exclude_id: Option<String>,
}

impl BookingQuery {
    /// Bookings of `room_id` on `date`.
    pub fn for_room_on(room_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            room_id: Some(room_id.into()),
            date: Some(date),
            ..Self::default()
        }
    }

    /// Restricts the query to the given statuses.
    pub fn with_statuses(mut self, statuses: &[BookingStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Leaves out the booking with this identifier.
    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Returns true if `booking` satisfies every set condition.
    pub fn matches(&self, booking: &RoomBooking) -> bool {
        self.room_id.as_ref().is_none_or(|id| *id == booking.room_id)
            && self.date.is_none_or(|date| date == booking.date())
            && (self.statuses.is_empty() || self.statuses.contains(&booking.status))
            && self.exclude_id.as_ref().is_none_or(|id| *id != booking.id)
    }
}

/// Predicate for fetching attendance events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceQuery {
    /// Only events of these users.
    pub user_ids: Option<Vec<String>>,
}

impl AttendanceQuery {
    /// Events of any of `user_ids`.
    pub fn for_users(user_ids: &[String]) -> Self {
        Self {
            user_ids: Some(user_ids.to_vec()),
        }
    }

    /// Returns true if `event` satisfies every set condition.
    pub fn matches(&self, event: &AttendanceEvent) -> bool {
        self.user_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&event.user_id))
    }
}

/// Storage backend used by the services.
///
/// Each call is a single atomic operation from the caller's perspective;
/// a failed call leaves the store unchanged.
pub trait RecordStore: Send + Sync {
    /// Fetches leave requests matching `query`, newest first.
    fn fetch_leave_requests(&self, query: &LeaveQuery) -> StoreResult<Vec<LeaveRequest>>;

    /// Fetches one leave request.
    fn get_leave_request(&self, id: &str) -> StoreResult<LeaveRequest>;

    /// Inserts a new leave request.
    fn insert_leave_request(&self, request: LeaveRequest) -> StoreResult<()>;

    /// Replaces the leave request with the same identifier.
    fn update_leave_request(&self, request: LeaveRequest) -> StoreResult<()>;

    /// Deletes a leave request.
    fn delete_leave_request(&self, id: &str) -> StoreResult<()>;

    /// Fetches bookings matching `query`, earliest first.
    fn fetch_bookings(&self, query: &BookingQuery) -> StoreResult<Vec<RoomBooking>>;

    /// Fetches one booking.
    fn get_booking(&self, id: &str) -> StoreResult<RoomBooking>;

    /// Inserts a new booking.
    fn insert_booking(&self, booking: RoomBooking) -> StoreResult<()>;

    /// Replaces the booking with the same identifier.
    fn update_booking(&self, booking: RoomBooking) -> StoreResult<()>;

    /// Fetches attendance events matching `query`.
    fn fetch_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceEvent>>;

    /// Records an attendance event.
    fn insert_attendance(&self, event: AttendanceEvent) -> StoreResult<()>;

    /// Queues a notification.
    fn insert_notification(&self, notification: Notification) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceEventType, LeaveType};
    use chrono::{NaiveDateTime, Utc};

    fn leave(id: &str, owner: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            user_id: owner.to_string(),
            leave_type: LeaveType::Annual,
            custom_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            reason: None,
            status,
            approver_id: "leader".to_string(),
            rejection_reason: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    fn booking(id: &str, room: &str, start: &str, status: BookingStatus) -> RoomBooking {
        let start_time = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        RoomBooking {
            id: id.to_string(),
            room_id: room.to_string(),
            user_id: "owner".to_string(),
            title: "Sync".to_string(),
            description: None,
            start_time,
            end_time: start_time + chrono::Duration::hours(1),
            status,
            attendees: Default::default(),
        }
    }

    #[test]
    fn test_leave_query_conditions_combine() {
        let query = LeaveQuery::for_user("alice")
            .with_statuses(&LeaveStatus::QUALIFYING)
            .excluding("l2");

        assert!(query.matches(&leave("l1", "alice", LeaveStatus::Pending)));
        assert!(!query.matches(&leave("l2", "alice", LeaveStatus::Pending)));
        assert!(!query.matches(&leave("l3", "alice", LeaveStatus::Rejected)));
        assert!(!query.matches(&leave("l4", "bob", LeaveStatus::Approved)));
    }

    #[test]
    fn test_empty_leave_query_matches_everything() {
        let query = LeaveQuery::default();
        assert!(query.matches(&leave("l1", "alice", LeaveStatus::Rejected)));
    }

    #[test]
    fn test_leave_query_for_team() {
        let query = LeaveQuery::for_users(&["alice".to_string(), "carol".to_string()]);
        assert!(query.matches(&leave("l1", "carol", LeaveStatus::Pending)));
        assert!(!query.matches(&leave("l2", "bob", LeaveStatus::Pending)));
    }

    #[test]
    fn test_booking_query_filters_room_day_and_status() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let query =
            BookingQuery::for_room_on("room_a", date).with_statuses(&BookingStatus::HOLDS_ROOM);

        assert!(query.matches(&booking("b1", "room_a", "2024-06-10 09:00", BookingStatus::Approved)));
        assert!(!query.matches(&booking("b2", "room_b", "2024-06-10 09:00", BookingStatus::Approved)));
        assert!(!query.matches(&booking("b3", "room_a", "2024-06-11 09:00", BookingStatus::Approved)));
        assert!(!query.matches(&booking("b4", "room_a", "2024-06-10 09:00", BookingStatus::Pending)));
    }

    #[test]
    fn test_booking_query_excludes_edited_booking() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let query = BookingQuery::for_room_on("room_a", date).excluding("b1");

        assert!(!query.matches(&booking("b1", "room_a", "2024-06-10 09:00", BookingStatus::Approved)));
        assert!(query.matches(&booking("b2", "room_a", "2024-06-10 11:00", BookingStatus::Approved)));
    }

    #[test]
    fn test_attendance_query_for_team() {
        let event = |user: &str| AttendanceEvent {
            id: format!("e_{}", user),
            user_id: user.to_string(),
            event_type: AttendanceEventType::CheckIn,
            timestamp: Utc::now(),
        };
        let query = AttendanceQuery::for_users(&["alice".to_string()]);

        assert!(query.matches(&event("alice")));
        assert!(!query.matches(&event("bob")));
        assert!(AttendanceQuery::default().matches(&event("bob")));
    }

    #[test]
    fn test_store_error_conversion() {
        let not_found: EngineError = StoreError::NotFound {
            table: "leave_requests",
            id: "l1".to_string(),
        }
        .into();
        assert!(matches!(not_found, EngineError::NotFound { ref id, .. } if id == "l1"));

        let unavailable: EngineError = StoreError::Unavailable {
            operation: "fetch leave_requests".to_string(),
            message: "connection reset".to_string(),
        }
        .into();
        match unavailable {
            EngineError::RemoteOperation { operation, message } => {
                assert_eq!(operation, "fetch leave_requests");
                assert_eq!(message, "connection reset");
            }
            other => panic!("Expected RemoteOperation, got {:?}", other),
        }
    }
}
