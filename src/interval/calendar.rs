//! Calendar views over leave requests.
//!
//! Used for the team leave calendar (which requests touch a month, who is
//! away on a given day) and for filtering a user's leave history.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{LeaveRequest, LeaveStatus};

use super::{IntervalBounds, Scheduled, Span};

/// Returns the first and last day of a month, or `None` for an invalid month.
///
/// # Examples
///
/// ```
/// use workforce_engine::interval::month_window;
/// use chrono::NaiveDate;
///
/// let february = month_window(2024, 2).unwrap();
/// assert_eq!(february.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(february.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert!(month_window(2024, 13).is_none());
/// ```
pub fn month_window(year: i32, month: u32) -> Option<Span<NaiveDate>> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(Span::new(start, next_month.pred_opt()?))
}

/// Requests whose days intersect `window` (both inclusive), in input order.
pub fn leaves_in_window<'a>(
    requests: &'a [LeaveRequest],
    window: &Span<NaiveDate>,
) -> Vec<&'a LeaveRequest> {
    requests
        .iter()
        .filter(|request| request.span().overlaps(window, IntervalBounds::Inclusive))
        .collect()
}

/// Requests covering `date`, in input order.
pub fn leaves_on(requests: &[LeaveRequest], date: NaiveDate) -> Vec<&LeaveRequest> {
    requests
        .iter()
        .filter(|request| request.span().contains(date, IntervalBounds::Inclusive))
        .collect()
}

/// One day of a team calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The day.
    pub date: NaiveDate,
    /// Requests covering the day.
    pub leave_ids: Vec<String>,
}

/// A team's leave for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCalendar {
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
    /// Requests touching the month in any status, by start day then user.
    pub requests: Vec<LeaveRequest>,
    /// Every day of the month, in order.
    pub days: Vec<CalendarDay>,
}

impl TeamCalendar {
    /// Builds the calendar for `year`/`month`, or `None` for an invalid month.
    pub fn for_month(requests: &[LeaveRequest], year: i32, month: u32) -> Option<Self> {
        let window = month_window(year, month)?;

        let mut in_month: Vec<LeaveRequest> = leaves_in_window(requests, &window)
            .into_iter()
            .cloned()
            .collect();
        in_month.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let days = window
            .start
            .iter_days()
            .take_while(|date| *date <= window.end)
            .map(|date| CalendarDay {
                date,
                leave_ids: leaves_on(&in_month, date)
                    .into_iter()
                    .map(|request| request.id.clone())
                    .collect(),
            })
            .collect();

        Some(Self {
            year,
            month,
            requests: in_month,
            days,
        })
    }
}

/// Criteria for browsing leave history. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveFilter {
    /// Only requests in this status.
    #[serde(default)]
    pub status: Option<LeaveStatus>,
    /// Only requests starting in this month (1-12).
    #[serde(default)]
    pub month: Option<u32>,
    /// Only requests starting in this year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Only requests ending on or after this day.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Only requests starting on or before this day.
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl LeaveFilter {
    /// Returns true if `request` satisfies every set criterion.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        let status_ok = self.status.is_none_or(|status| request.status == status);
        let month_ok = self
            .month
            .is_none_or(|month| request.start_date.month() == month);
        let year_ok = self.year.is_none_or(|year| request.start_date.year() == year);
        let from_ok = self.from.is_none_or(|from| request.end_date >= from);
        let to_ok = self.to.is_none_or(|to| request.start_date <= to);

        status_ok && month_ok && year_ok && from_ok && to_ok
    }

    /// Applies the filter, keeping input order.
    pub fn apply<'a>(&self, requests: &'a [LeaveRequest]) -> Vec<&'a LeaveRequest> {
        requests.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveType;
    use chrono::Utc;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn leave(id: &str, start: &str, end: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            user_id: "user_001".to_string(),
            leave_type: LeaveType::Annual,
            custom_type_id: None,
            start_date: make_date(start),
            end_date: make_date(end),
            reason: None,
            status,
            approver_id: "leader_001".to_string(),
            rejection_reason: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn test_month_window_december_rolls_over() {
        let december = month_window(2024, 12).unwrap();
        assert_eq!(december.start, make_date("2024-12-01"));
        assert_eq!(december.end, make_date("2024-12-31"));
    }

    #[test]
    fn test_leaves_in_window_includes_spanning_requests() {
        let requests = vec![
            leave("before", "2024-05-20", "2024-05-31", LeaveStatus::Approved),
            leave("straddle", "2024-05-30", "2024-06-02", LeaveStatus::Approved),
            leave("inside", "2024-06-10", "2024-06-12", LeaveStatus::Pending),
            leave("last_day", "2024-06-30", "2024-07-03", LeaveStatus::Pending),
            leave("after", "2024-07-01", "2024-07-03", LeaveStatus::Pending),
        ];
        let june = month_window(2024, 6).unwrap();

        let ids: Vec<&str> = leaves_in_window(&requests, &june)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["straddle", "inside", "last_day"]);
    }

    #[test]
    fn test_leaves_on_includes_both_endpoints() {
        let requests = vec![leave("l1", "2024-06-10", "2024-06-12", LeaveStatus::Approved)];

        assert_eq!(leaves_on(&requests, make_date("2024-06-10")).len(), 1);
        assert_eq!(leaves_on(&requests, make_date("2024-06-12")).len(), 1);
        assert!(leaves_on(&requests, make_date("2024-06-13")).is_empty());
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let requests = vec![
            leave("l1", "2024-06-10", "2024-06-12", LeaveStatus::Approved),
            leave("l2", "2023-01-01", "2023-01-01", LeaveStatus::Rejected),
        ];
        assert_eq!(LeaveFilter::default().apply(&requests).len(), 2);
    }

    #[test]
    fn test_filter_by_status_month_and_year() {
        let requests = vec![
            leave("l1", "2024-06-10", "2024-06-12", LeaveStatus::Approved),
            leave("l2", "2024-06-20", "2024-06-21", LeaveStatus::Pending),
            leave("l3", "2023-06-10", "2023-06-12", LeaveStatus::Approved),
        ];
        let filter = LeaveFilter {
            status: Some(LeaveStatus::Approved),
            month: Some(6),
            year: Some(2024),
            ..Default::default()
        };

        let ids: Vec<&str> = filter.apply(&requests).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["l1"]);
    }

    #[test]
    fn test_filter_by_date_range_uses_overlap() {
        let requests = vec![
            leave("l1", "2024-06-10", "2024-06-12", LeaveStatus::Approved),
            leave("l2", "2024-06-20", "2024-06-21", LeaveStatus::Pending),
        ];
        let filter = LeaveFilter {
            from: Some(make_date("2024-06-12")),
            to: Some(make_date("2024-06-15")),
            ..Default::default()
        };

        let ids: Vec<&str> = filter.apply(&requests).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["l1"]);
    }

    #[test]
    fn test_team_calendar_lists_every_day_of_month() {
        let requests = vec![
            leave("late", "2024-02-28", "2024-03-01", LeaveStatus::Rejected),
            leave("early", "2024-01-30", "2024-02-02", LeaveStatus::Approved),
            leave("march", "2024-03-05", "2024-03-06", LeaveStatus::Pending),
        ];

        let calendar = TeamCalendar::for_month(&requests, 2024, 2).unwrap();

        assert_eq!(calendar.days.len(), 29);
        let ids: Vec<&str> = calendar.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(calendar.days[0].date, make_date("2024-02-01"));
        assert_eq!(calendar.days[0].leave_ids, vec!["early".to_string()]);
        assert!(calendar.days[2].leave_ids.is_empty());
        assert_eq!(calendar.days[28].leave_ids, vec!["late".to_string()]);
    }

    #[test]
    fn test_team_calendar_rejects_invalid_month() {
        assert!(TeamCalendar::for_month(&[], 2024, 13).is_none());
        assert!(TeamCalendar::for_month(&[], 2024, 0).is_none());
    }
}
