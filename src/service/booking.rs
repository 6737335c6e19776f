//! Meeting room booking workflow.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{notify, remote};
use crate::config::ConfigLoader;
use crate::error::{ConflictKind, EngineError, EngineResult, ValidationRule};
use crate::interval::{IntervalSet, Span};
use crate::models::{Actor, BookingStatus, Notification, RoomBooking};
use crate::store::{BookingQuery, RecordStore};

/// Booking details as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// The room to book.
    #[serde(default)]
    pub room_id: String,
    /// Title of the meeting.
    #[serde(default)]
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start of the meeting.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// End of the meeting (excluded).
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    /// Users to invite. Ignored when editing.
    #[serde(default)]
    pub attendees: Vec<String>,
}

struct ValidDraft {
    room_id: String,
    title: String,
    description: Option<String>,
    span: Span<NaiveDateTime>,
}

impl BookingDraft {
    /// Required fields, then same-day, then a non-empty range.
    fn validate(&self) -> EngineResult<ValidDraft> {
        let title = self.title.trim();
        let room_id = self.room_id.trim();
        let (start_time, end_time) = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if !title.is_empty() && !room_id.is_empty() => (start, end),
            _ => {
                return Err(EngineError::validation(
                    ValidationRule::MissingField,
                    "Please fill in all required fields",
                ));
            }
        };

        if start_time.date() != end_time.date() {
            return Err(EngineError::validation(
                ValidationRule::CrossDaySpan,
                "Booking must be on the same day. Please select start and end times on the same date.",
            ));
        }

        if start_time >= end_time {
            return Err(EngineError::validation(
                ValidationRule::EmptyTimeRange,
                "End time must be after start time",
            ));
        }

        Ok(ValidDraft {
            room_id: room_id.to_string(),
            title: title.to_string(),
            description: self.description.clone().filter(|d| !d.trim().is_empty()),
            span: Span::new(start_time, end_time),
        })
    }
}

/// Creates, edits, decides and cancels room bookings.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn RecordStore>,
    config: Arc<ConfigLoader>,
}

impl BookingService {
    /// Creates a service over `store` with the given policy.
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigLoader>) -> Self {
        Self { store, config }
    }

    /// Books a room for `actor`.
    ///
    /// The booking starts approved or pending depending on the room
    /// policy. Invited users other than the owner are notified.
    pub fn create(&self, actor: &Actor, draft: BookingDraft) -> EngineResult<RoomBooking> {
        let valid = draft.validate()?;
        self.ensure_room_free(&valid.room_id, &valid.span, None)?;

        let status = if self.config.auto_approve_bookings() {
            BookingStatus::Approved
        } else {
            BookingStatus::Pending
        };

        let mut booking = RoomBooking {
            id: Uuid::new_v4().to_string(),
            room_id: valid.room_id,
            user_id: actor.user_id.clone(),
            title: valid.title,
            description: valid.description,
            start_time: valid.span.start,
            end_time: valid.span.end,
            status,
            attendees: BTreeSet::new(),
        };
        for attendee in draft.attendees.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            booking.add_attendee(attendee);
        }

        remote(self.store.insert_booking(booking.clone()))?;

        info!(
            record_id = %booking.id,
            room_id = %booking.room_id,
            user_id = %booking.user_id,
            status = %booking.status,
            minutes = booking.duration_minutes(),
            "Room booked"
        );

        for attendee in &booking.attendees {
            notify(
                self.store.as_ref(),
                Notification::booking(attendee, &booking.title, &booking.room_id),
            );
        }

        Ok(booking)
    }

    /// Changes the room, title, description and times of the actor's booking.
    ///
    /// The status and attendees are left as they are. The conflict check
    /// ignores the booking being edited.
    pub fn edit(&self, actor: &Actor, id: &str, draft: BookingDraft) -> EngineResult<RoomBooking> {
        let mut booking = remote(self.store.get_booking(id))?;

        if booking.user_id != actor.user_id {
            return Err(EngineError::forbidden("edit another user's booking"));
        }
        if booking.status.is_terminal() {
            return Err(EngineError::forbidden(format!(
                "edit a {} booking",
                booking.status
            )));
        }

        let valid = draft.validate()?;
        self.ensure_room_free(&valid.room_id, &valid.span, Some(id))?;

        booking.room_id = valid.room_id;
        booking.title = valid.title;
        booking.description = valid.description;
        booking.start_time = valid.span.start;
        booking.end_time = valid.span.end;

        remote(self.store.update_booking(booking.clone()))?;
        info!(record_id = %booking.id, user_id = %actor.user_id, "Booking updated");

        Ok(booking)
    }

    /// Approves a pending booking. Leaders and admins only.
    ///
    /// The room is checked again so that approved bookings never overlap.
    pub fn approve(&self, actor: &Actor, id: &str) -> EngineResult<RoomBooking> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("decide on bookings"));
        }

        let mut booking = remote(self.store.get_booking(id))?;
        let status = booking.status.transition(BookingStatus::Approved)?;
        self.ensure_room_free(
            &booking.room_id,
            &Span::new(booking.start_time, booking.end_time),
            Some(id),
        )?;
        booking.status = status;

        self.store_decision(actor, booking, true)
    }

    /// Rejects a pending booking. Leaders and admins only.
    pub fn reject(&self, actor: &Actor, id: &str) -> EngineResult<RoomBooking> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("decide on bookings"));
        }

        let mut booking = remote(self.store.get_booking(id))?;
        booking.status = booking.status.transition(BookingStatus::Rejected)?;

        self.store_decision(actor, booking, false)
    }

    fn store_decision(
        &self,
        actor: &Actor,
        booking: RoomBooking,
        approved: bool,
    ) -> EngineResult<RoomBooking> {
        remote(self.store.update_booking(booking.clone()))?;

        info!(
            record_id = %booking.id,
            room_id = %booking.room_id,
            decided_by = %actor.user_id,
            status = %booking.status,
            "Booking decided"
        );

        notify(
            self.store.as_ref(),
            Notification::booking_decision(&booking.user_id, &booking.title, approved),
        );

        Ok(booking)
    }

    /// Cancels a pending or approved booking. Owners and admins only.
    pub fn cancel(&self, actor: &Actor, id: &str) -> EngineResult<RoomBooking> {
        let mut booking = remote(self.store.get_booking(id))?;

        if !actor.owns_or_admin(&booking.user_id) {
            return Err(EngineError::forbidden("cancel another user's booking"));
        }
        booking.status = booking.status.transition(BookingStatus::Cancelled)?;

        remote(self.store.update_booking(booking.clone()))?;
        info!(record_id = %booking.id, user_id = %actor.user_id, "Booking cancelled");

        Ok(booking)
    }

    /// Adds `user_id` to the attendees.
    ///
    /// Users may join themselves; the owner and admins may add anyone.
    /// Adding the owner or an existing attendee changes nothing.
    pub fn add_attendee(&self, actor: &Actor, id: &str, user_id: &str) -> EngineResult<RoomBooking> {
        let mut booking = self.attendance_change(actor, id, user_id)?;

        if !booking.add_attendee(user_id) {
            debug!(record_id = %id, user_id, "Attendee already present");
            return Ok(booking);
        }

        remote(self.store.update_booking(booking.clone()))?;
        info!(record_id = %id, user_id, "Attendee added");

        if user_id != actor.user_id {
            notify(
                self.store.as_ref(),
                Notification::booking(user_id, &booking.title, &booking.room_id),
            );
        }

        Ok(booking)
    }

    /// Removes `user_id` from the attendees, with the same permissions as
    /// [`BookingService::add_attendee`].
    pub fn remove_attendee(
        &self,
        actor: &Actor,
        id: &str,
        user_id: &str,
    ) -> EngineResult<RoomBooking> {
        let mut booking = self.attendance_change(actor, id, user_id)?;

        if !booking.remove_attendee(user_id) {
            debug!(record_id = %id, user_id, "Attendee not present");
            return Ok(booking);
        }

        remote(self.store.update_booking(booking.clone()))?;
        info!(record_id = %id, user_id, "Attendee removed");

        Ok(booking)
    }

    fn attendance_change(&self, actor: &Actor, id: &str, user_id: &str) -> EngineResult<RoomBooking> {
        let booking = remote(self.store.get_booking(id))?;

        if actor.user_id != user_id && !actor.owns_or_admin(&booking.user_id) {
            return Err(EngineError::forbidden("change another user's attendance"));
        }
        if booking.status.is_terminal() {
            return Err(EngineError::forbidden(format!(
                "change attendees of a {} booking",
                booking.status
            )));
        }

        Ok(booking)
    }

    fn ensure_room_free(
        &self,
        room_id: &str,
        span: &Span<NaiveDateTime>,
        exclude_id: Option<&str>,
    ) -> EngineResult<()> {
        let mut query = BookingQuery::for_room_on(room_id, span.start.date())
            .with_statuses(&BookingStatus::HOLDS_ROOM);
        if let Some(id) = exclude_id {
            query = query.excluding(id);
        }
        let existing = remote(self.store.fetch_bookings(&query))?;

        match IntervalSet::new(&existing, &BookingStatus::HOLDS_ROOM).first_conflict(span) {
            Some(conflicting) => Err(EngineError::Conflict {
                kind: ConflictKind::RoomTime,
                conflicting_id: conflicting.id.clone(),
            }),
            None => Ok(()),
        }
    }
}
