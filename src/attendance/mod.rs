//! Attendance statistics.
//!
//! Events are grouped by user and calendar day. A day counts as present
//! when it has any event; worked hours pair the day's earliest check-in
//! with its latest check-out.

mod aggregator;
mod metrics;

pub use aggregator::{AttendanceAggregator, DEFAULT_MAX_WORKDAY_HOURS, DailyAttendance};
pub use metrics::{TeamMetrics, WindowRatio};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::AttendanceEvent;

/// Presence ratio over a trailing window, using the local calendar.
pub fn presence_ratio(events: &[AttendanceEvent], window_days: u32, now: DateTime<Utc>) -> u32 {
    AttendanceAggregator::local().presence_ratio(events, window_days, now)
}

/// Total worked hours rounded to one decimal, using the local calendar.
pub fn total_worked_hours(events: &[AttendanceEvent]) -> Decimal {
    AttendanceAggregator::local().total_worked_hours(events)
}
