//! HTTP API module for the workforce engine.
//!
//! This module provides the REST endpoints for leave requests, room
//! bookings, attendance and the stateless conflict checks.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{USER_ID_HEADER, USER_ROLE_HEADER, create_router};
pub use request::{
    AttendanceRequest, AttendeeRequest, BookingConflictRequest, ExistingBooking, ExistingLeave,
    LeaveConflictRequest, RejectRequest, TeamCalendarRequest, TeamMetricsRequest,
};
pub use response::{ApiError, ApiErrorResponse, ConflictCheckResponse};
pub use state::AppState;
