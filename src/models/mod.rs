//! Core data models for the workforce engine.
//!
//! Records arrive from the record store as loosely-shaped rows; they are
//! mapped once into these typed records and validated at the boundary.

mod actor;
mod attendance;
mod leave_request;
mod notification;
mod room_booking;
mod status;

pub use actor::{Actor, Role};
pub use attendance::{AttendanceEvent, AttendanceEventType};
pub use leave_request::{LeaveRequest, LeaveType};
pub use notification::{Notification, NotificationKind};
pub use room_booking::RoomBooking;
pub use status::{BookingStatus, LeaveStatus};
