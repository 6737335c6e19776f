//! Interval overlap detection for leave requests and room bookings.
//!
//! Leave is booked in whole days, so its ranges are inclusive: a request
//! ending on the 12th collides with one starting on the 12th. Bookings are
//! booked in instants, so their ranges are half-open: a meeting ending at
//! 10:00 does not collide with one starting at 10:00.
//!
//! The existing records are always handed in by the caller; nothing here
//! fetches data.
//!
//! # Example
//!
//! ```
//! use workforce_engine::interval::{IntervalBounds, Span};
//! use chrono::NaiveDate;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
//! let existing = Span::new(d(10), d(12));
//!
//! assert!(Span::new(d(12), d(14)).overlaps(&existing, IntervalBounds::Inclusive));
//! assert!(!Span::new(d(12), d(14)).overlaps(&existing, IntervalBounds::HalfOpen));
//! assert!(!Span::new(d(13), d(15)).overlaps(&existing, IntervalBounds::Inclusive));
//! ```

mod calendar;

pub use calendar::{CalendarDay, LeaveFilter, TeamCalendar, leaves_in_window, leaves_on, month_window};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{BookingStatus, LeaveRequest, LeaveStatus, RoomBooking};

/// How the endpoints of a range are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalBounds {
    /// Both endpoints are occupied (`[start, end]`).
    Inclusive,
    /// The end is excluded (`[start, end)`).
    HalfOpen,
}

/// A range between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span<T> {
    /// First point of the range.
    pub start: T,
    /// Last (inclusive) or first free (half-open) point of the range.
    pub end: T,
}

impl<T: Ord + Copy> Span<T> {
    /// Creates a span. Ordering is not checked here.
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// Returns true if the two spans share at least one point.
    pub fn overlaps(&self, other: &Span<T>, bounds: IntervalBounds) -> bool {
        match bounds {
            IntervalBounds::Inclusive => !(self.end < other.start || self.start > other.end),
            IntervalBounds::HalfOpen => !(self.end <= other.start || self.start >= other.end),
        }
    }

    /// Returns true if `point` lies within the span.
    pub fn contains(&self, point: T, bounds: IntervalBounds) -> bool {
        match bounds {
            IntervalBounds::Inclusive => self.start <= point && point <= self.end,
            IntervalBounds::HalfOpen => self.start <= point && point < self.end,
        }
    }

    /// Returns true if the span covers at least one point.
    ///
    /// An inclusive span may start and end at the same point; a half-open
    /// one must end strictly after it starts.
    pub fn is_well_formed(&self, bounds: IntervalBounds) -> bool {
        match bounds {
            IntervalBounds::Inclusive => self.start <= self.end,
            IntervalBounds::HalfOpen => self.start < self.end,
        }
    }
}

/// A record occupying a range of time, with a status deciding whether it
/// currently counts.
pub trait Scheduled {
    /// The point type of the range.
    type Point: Ord + Copy;
    /// The status type of the record.
    type Status: PartialEq + Copy;
    /// Endpoint semantics for this kind of record.
    const BOUNDS: IntervalBounds;

    /// Identifier of the record.
    fn record_id(&self) -> &str;
    /// The occupied range.
    fn span(&self) -> Span<Self::Point>;
    /// The current status.
    fn status(&self) -> Self::Status;
}

impl Scheduled for LeaveRequest {
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

impl Scheduled for RoomBooking {
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

/// A view over existing records answering overlap questions.
///
/// Only records whose status is in the relevant set take part. When a
/// record is being edited, exclude its own identifier so it does not
/// collide with its previous version.
pub struct IntervalSet<'a, R: Scheduled> {
    records: &'a [R],
    statuses: &'a [R::Status],
    bounds: IntervalBounds,
    excluded_id: Option<&'a str>,
}

impl<'a, R: Scheduled> IntervalSet<'a, R> {
    /// Creates a set over `records`, counting only the given statuses.
    pub fn new(records: &'a [R], statuses: &'a [R::Status]) -> Self {
        Self {
            records,
            statuses,
            bounds: R::BOUNDS,
            excluded_id: None,
        }
    }

    /// Ignores the record with this identifier.
    pub fn excluding(mut self, id: &'a str) -> Self {
        self.excluded_id = Some(id);
        self
    }

    /// Overrides the endpoint semantics of the record type.
    pub fn with_bounds(mut self, bounds: IntervalBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// The endpoint semantics in use.
    pub fn bounds(&self) -> IntervalBounds {
        self.bounds
    }

    fn active(&self) -> impl Iterator<Item = &'a R> {
        let statuses = self.statuses;
        let excluded_id = self.excluded_id;
        self.records.iter().filter(move |record| {
            statuses.contains(&record.status()) && excluded_id != Some(record.record_id())
        })
    }

    /// Returns true if `candidate` overlaps any counted record.
    pub fn has_conflict(&self, candidate: &Span<R::Point>) -> bool {
        self.first_conflict(candidate).is_some()
    }

    /// Returns the first counted record overlapping `candidate`.
    pub fn first_conflict(&self, candidate: &Span<R::Point>) -> Option<&'a R> {
        let bounds = self.bounds;
        self.active()
            .find(|record| candidate.overlaps(&record.span(), bounds))
    }

    /// Returns every counted record overlapping `candidate`.
    pub fn conflicts(&self, candidate: &Span<R::Point>) -> Vec<&'a R> {
        let bounds = self.bounds;
        self.active()
            .filter(|record| candidate.overlaps(&record.span(), bounds))
            .collect()
    }
}

/// Returns true if `candidate` overlaps an existing record whose status is
/// in `relevant_statuses`, using the record type's endpoint semantics.
///
/// # Examples
///
/// ```
/// use workforce_engine::interval::{has_conflict, Span};
/// use workforce_engine::models::{BookingStatus, RoomBooking};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let existing = vec![RoomBooking {
///     id: "b1".to_string(),
///     room_id: "room_r".to_string(),
///     user_id: "owner".to_string(),
///     title: "Standup".to_string(),
///     description: None,
///     start_time: at("2024-06-10 09:00"),
///     end_time: at("2024-06-10 10:00"),
///     status: BookingStatus::Approved,
///     attendees: Default::default(),
/// }];
///
/// let back_to_back = Span::new(at("2024-06-10 10:00"), at("2024-06-10 11:00"));
/// let overlapping = Span::new(at("2024-06-10 09:30"), at("2024-06-10 10:30"));
///
/// assert!(!has_conflict(&back_to_back, &existing, &BookingStatus::HOLDS_ROOM));
/// assert!(has_conflict(&overlapping, &existing, &BookingStatus::HOLDS_ROOM));
/// ```
pub fn has_conflict<R: Scheduled>(
    candidate: &Span<R::Point>,
    existing: &[R],
    relevant_statuses: &[R::Status],
) -> bool {
    IntervalSet::new(existing, relevant_statuses).has_conflict(candidate)
}
