//! Presence and worked-hours aggregation over attendance events.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceEvent, AttendanceEventType};

/// Longest check-in to check-out gap, in hours, that still counts as work.
pub const DEFAULT_MAX_WORKDAY_HOURS: i64 = 24;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// One user's attendance on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendance {
    /// The user.
    pub user_id: String,
    /// The calendar day the events fall on.
    pub date: NaiveDate,
    /// Earliest check-in of the day.
    pub first_check_in: Option<DateTime<Utc>>,
    /// Latest check-out of the day.
    pub last_check_out: Option<DateTime<Utc>>,
    /// Hours between the two, or zero when they cannot be paired.
    pub worked_hours: Decimal,
}

/// Groups attendance events into calendar days and derives statistics.
///
/// Days are taken from each timestamp in the aggregator's time zone.
/// [`AttendanceAggregator::local`] uses the machine's local zone.
///
/// # Example
///
/// ```
/// use workforce_engine::attendance::AttendanceAggregator;
/// use workforce_engine::models::{AttendanceEvent, AttendanceEventType};
/// use chrono::{DateTime, Utc};
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
/// let events = vec![
///     AttendanceEvent {
///         id: "e1".to_string(),
///         user_id: "u1".to_string(),
///         event_type: AttendanceEventType::CheckIn,
///         timestamp: at("2024-06-10T09:00:00Z"),
///     },
///     AttendanceEvent {
///         id: "e2".to_string(),
///         user_id: "u1".to_string(),
///         event_type: AttendanceEventType::CheckOut,
///         timestamp: at("2024-06-10T17:30:00Z"),
///     },
/// ];
///
/// let aggregator = AttendanceAggregator::with_timezone(Utc);
/// assert_eq!(aggregator.total_worked_hours(&events), Decimal::new(85, 1));
/// ```
#[derive(Debug, Clone)]
pub struct AttendanceAggregator<Tz: TimeZone> {
    timezone: Tz,
    max_workday: Duration,
}

impl AttendanceAggregator<Local> {
    /// An aggregator using the machine's local calendar.
    pub fn local() -> Self {
        Self::with_timezone(Local)
    }
}

impl Default for AttendanceAggregator<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> AttendanceAggregator<Tz> {
    /// An aggregator that assigns events to days in `timezone`.
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            timezone,
            max_workday: Duration::hours(DEFAULT_MAX_WORKDAY_HOURS),
        }
    }

    /// Changes the longest gap that still counts as a worked day.
    pub fn with_max_workday_hours(mut self, hours: u32) -> Self {
        self.max_workday = Duration::hours(i64::from(hours));
        self
    }

    /// The calendar day of `timestamp` in this aggregator's time zone.
    pub fn calendar_day(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.timezone).date_naive()
    }

    /// Counts distinct (user, day) pairs with at least one event in
    /// `[now - window_days, now]`.
    pub fn presence_days(
        &self,
        events: &[AttendanceEvent],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> usize {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        events
            .iter()
            .filter(|event| event.timestamp >= cutoff && event.timestamp <= now)
            .map(|event| (event.user_id.as_str(), self.calendar_day(&event.timestamp)))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Percentage of present days within the trailing window, rounded to an
    /// integer. Returns 0 when there are no events in the window.
    ///
    /// Present days are measured against themselves, so any presence at all
    /// yields 100. This is the established behaviour of the metric and is
    /// kept until the intended denominator (e.g. expected working days) is
    /// settled.
    pub fn presence_ratio(
        &self,
        events: &[AttendanceEvent],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> u32 {
        let present_days = self.presence_days(events, window_days, now);
        if present_days == 0 {
            return 0;
        }
        let total_days = present_days;

        let ratio = Decimal::from(present_days as u64) / Decimal::from(total_days as u64)
            * Decimal::ONE_HUNDRED;
        ratio
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }

    /// Per (user, day) attendance, ordered by user then day.
    ///
    /// Within a day the earliest check-in and latest check-out are paired.
    /// The pair counts only when the check-out is after the check-in and the
    /// gap does not exceed the maximum workday.
    pub fn daily_summaries(&self, events: &[AttendanceEvent]) -> Vec<DailyAttendance> {
        let mut days: BTreeMap<(&str, NaiveDate), (Option<DateTime<Utc>>, Option<DateTime<Utc>>)> =
            BTreeMap::new();

        for event in events {
            let key = (event.user_id.as_str(), self.calendar_day(&event.timestamp));
            let (check_in, check_out) = days.entry(key).or_default();
            match event.event_type {
                AttendanceEventType::CheckIn => {
                    if check_in.is_none_or(|current| event.timestamp < current) {
                        *check_in = Some(event.timestamp);
                    }
                }
                AttendanceEventType::CheckOut => {
                    if check_out.is_none_or(|current| event.timestamp > current) {
                        *check_out = Some(event.timestamp);
                    }
                }
            }
        }

        days.into_iter()
            .map(|((user_id, date), (check_in, check_out))| DailyAttendance {
                user_id: user_id.to_string(),
                date,
                first_check_in: check_in,
                last_check_out: check_out,
                worked_hours: self.paired_hours(check_in, check_out),
            })
            .collect()
    }

    /// Total worked hours across all users and days, rounded to one decimal.
    pub fn total_worked_hours(&self, events: &[AttendanceEvent]) -> Decimal {
        let total: Decimal = self
            .daily_summaries(events)
            .iter()
            .map(|day| day.worked_hours)
            .sum();
        total.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }

    fn paired_hours(
        &self,
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
    ) -> Decimal {
        let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
            return Decimal::ZERO;
        };
        let gap = check_out - check_in;
        if gap <= Duration::zero() || gap > self.max_workday {
            return Decimal::ZERO;
        }
        Decimal::from(gap.num_milliseconds()) / Decimal::from(MILLIS_PER_HOUR)
    }
}
