//! Notifications queued for users after a successful action.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A leave request awaits the recipient's decision.
    LeaveRequest,
    /// The recipient's leave request was decided.
    LeaveDecision,
    /// The recipient was invited to a booking.
    Booking,
    /// The recipient's booking was decided.
    BookingDecision,
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient.
    pub user_id: String,
    /// Category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Where in the application the notification points to.
    #[serde(default)]
    pub link: Option<String>,
}

impl Notification {
    /// Tells an approver that a leave request is waiting.
    pub fn leave_request(
        approver_id: &str,
        requester: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: approver_id.to_string(),
            kind: NotificationKind::LeaveRequest,
            title: "New Leave Request".to_string(),
            message: format!(
                "{} has requested leave from {} to {}",
                requester, start_date, end_date
            ),
            link: Some("/leave".to_string()),
        }
    }

    /// Tells a requester their leave was approved or rejected.
    pub fn leave_decision(requester_id: &str, approved: bool) -> Self {
        let verdict = if approved { "approved" } else { "rejected" };
        Self {
            user_id: requester_id.to_string(),
            kind: NotificationKind::LeaveDecision,
            title: format!("Leave Request {}", capitalize(verdict)),
            message: format!("Your leave request has been {}", verdict),
            link: Some("/leave".to_string()),
        }
    }

    /// Tells an invitee about a new booking.
    pub fn booking(user_id: &str, booking_title: &str, room_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: NotificationKind::Booking,
            title: "New Room Booking".to_string(),
            message: format!("New booking created: \"{}\" in {}", booking_title, room_id),
            link: Some("/meeting-rooms".to_string()),
        }
    }

    /// Tells an owner their booking was approved or rejected.
    pub fn booking_decision(owner_id: &str, booking_title: &str, approved: bool) -> Self {
        let verdict = if approved { "approved" } else { "rejected" };
        Self {
            user_id: owner_id.to_string(),
            kind: NotificationKind::BookingDecision,
            title: format!("Booking {}", capitalize(verdict)),
            message: format!("Your booking \"{}\" has been {}", booking_title, verdict),
            link: Some("/meeting-rooms".to_string()),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
