//! Room booking model.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::BookingStatus;

/// A booking of a meeting room for a time range within one day.
///
/// Times are local wall-clock times; the range is half-open, so a booking
/// ending at 10:00 leaves the room free for one starting at 10:00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBooking {
    /// Unique identifier for the booking.
    pub id: String,
    /// The booked room.
    pub room_id: String,
    /// The user who made the booking.
    pub user_id: String,
    /// Title of the meeting.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start of the booking.
    pub start_time: NaiveDateTime,
    /// End of the booking (excluded).
    pub end_time: NaiveDateTime,
    /// Current status.
    pub status: BookingStatus,
    /// Invited users; never contains the owner.
    #[serde(default)]
    pub attendees: BTreeSet<String>,
}

impl RoomBooking {
    /// The calendar day of the booking.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Adds an attendee. Returns false if already present or the owner.
    pub fn add_attendee(&mut self, user_id: &str) -> bool {
        if user_id == self.user_id {
            return false;
        }
        self.attendees.insert(user_id.to_string())
    }

    /// Removes an attendee. Returns false if they were not invited.
    pub fn remove_attendee(&mut self, user_id: &str) -> bool {
        self.attendees.remove(user_id)
    }

    /// Duration of the booking in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}
