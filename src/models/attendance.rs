//! Attendance event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an attendance event marks arrival or departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceEventType {
    /// The user arrived.
    CheckIn,
    /// The user left.
    CheckOut,
}

/// A single check-in or check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Unique identifier for the event.
    pub id: String,
    /// The user the event belongs to.
    pub user_id: String,
    /// Check-in or check-out.
    #[serde(rename = "type")]
    pub event_type: AttendanceEventType,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}
