//! Request types for the workforce engine API.
//!
//! Leave and booking bodies reuse [`LeaveSubmission`](crate::service::LeaveSubmission),
//! [`LeaveEdit`](crate::service::LeaveEdit) and
//! [`BookingDraft`](crate::service::BookingDraft). The types here cover the
//! remaining endpoints.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{IntervalBounds, Scheduled, Span};
use crate::models::{AttendanceEventType, BookingStatus, LeaveStatus};

/// Request body for `POST /leave-requests/:id/reject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Why the request was rejected.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `POST /bookings/:id/attendees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeRequest {
    /// The user to add.
    pub user_id: String,
}

/// Request body for `POST /attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// Check-in or check-out.
    #[serde(rename = "type")]
    pub event_type: AttendanceEventType,
    /// When the event happened; defaults to the time of the request.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Request body for `POST /metrics/team` and `POST /team/pending-leave-requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMetricsRequest {
    /// Identifiers of the team members.
    pub members: Vec<String>,
}

/// Request body for `POST /team/leave-calendar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCalendarRequest {
    /// Identifiers of the team members.
    pub members: Vec<String>,
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
}

/// An existing leave range supplied to the stateless conflict check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLeave {
    /// Identifier, used to report conflicts and to exclude the edited record.
    #[serde(default)]
    pub id: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: LeaveStatus,
}

impl Scheduled for ExistingLeave {
    type Point = NaiveDate;
    type Status = LeaveStatus;
    const BOUNDS: IntervalBounds = IntervalBounds::Inclusive;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn span(&self) -> Span<NaiveDate> {
        Span::new(self.start_date, self.end_date)
    }

    fn status(&self) -> LeaveStatus {
        self.status
    }
}

/// Request body for `POST /check/leave-conflict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveConflictRequest {
    /// First day of the candidate range.
    pub start_date: NaiveDate,
    /// Last day of the candidate range (inclusive).
    pub end_date: NaiveDate,
    /// Identifier of the record being edited, if any.
    #[serde(default)]
    pub exclude_id: Option<String>,
    /// The user's existing requests.
    #[serde(default)]
    pub existing: Vec<ExistingLeave>,
}

/// An existing booking range supplied to the stateless conflict check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingBooking {
    /// Identifier, used to report conflicts and to exclude the edited record.
    #[serde(default)]
    pub id: String,
    /// Start of the booking.
    pub start_time: NaiveDateTime,
    /// End of the booking (excluded).
    pub end_time: NaiveDateTime,
    /// Current status.
    pub status: BookingStatus,
}

impl Scheduled for ExistingBooking {
    type Point = NaiveDateTime;
    type Status = BookingStatus;
    const BOUNDS: IntervalBounds = IntervalBounds::HalfOpen;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn span(&self) -> Span<NaiveDateTime> {
        Span::new(self.start_time, self.end_time)
    }

    fn status(&self) -> BookingStatus {
        self.status
    }
}

/// Request body for `POST /check/booking-conflict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConflictRequest {
    /// Start of the candidate range.
    pub start_time: NaiveDateTime,
    /// End of the candidate range (excluded).
    pub end_time: NaiveDateTime,
    /// Identifier of the record being edited, if any.
    #[serde(default)]
    pub exclude_id: Option<String>,
    /// The room's existing bookings.
    #[serde(default)]
    pub existing: Vec<ExistingBooking>,
}
