//! Team dashboard metrics.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceEvent, LeaveRequest, LeaveStatus};

use super::AttendanceAggregator;

/// Presence ratio over one trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRatio {
    /// Window length in days.
    pub window_days: u32,
    /// Rounded percentage.
    pub ratio: u32,
}

/// Summary figures for a leader's team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMetrics {
    /// Number of team members.
    pub team_size: usize,
    /// Presence ratio per requested window, in the order requested.
    pub presence_ratios: Vec<WindowRatio>,
    /// Worked hours of all members across all supplied events.
    pub total_working_hours: Decimal,
    /// Members' leave requests awaiting a decision.
    pub pending_leave_requests: usize,
}

impl TeamMetrics {
    /// Computes the metrics for `members`.
    ///
    /// Events and leave requests of users outside the team are ignored.
    pub fn compute<Tz: TimeZone>(
        aggregator: &AttendanceAggregator<Tz>,
        members: &[String],
        events: &[AttendanceEvent],
        leave_requests: &[LeaveRequest],
        windows: &[u32],
        now: DateTime<Utc>,
    ) -> Self {
        let team: HashSet<&str> = members.iter().map(String::as_str).collect();

        let team_events: Vec<AttendanceEvent> = events
            .iter()
            .filter(|event| team.contains(event.user_id.as_str()))
            .cloned()
            .collect();

        let presence_ratios = windows
            .iter()
            .map(|&window_days| WindowRatio {
                window_days,
                ratio: aggregator.presence_ratio(&team_events, window_days, now),
            })
            .collect();

        let pending_leave_requests = leave_requests
            .iter()
            .filter(|request| {
                request.status == LeaveStatus::Pending && team.contains(request.user_id.as_str())
            })
            .count();

        Self {
            team_size: team.len(),
            presence_ratios,
            total_working_hours: aggregator.total_worked_hours(&team_events),
            pending_leave_requests,
        }
    }

    /// The ratio for a given window, if it was computed.
    pub fn ratio_for(&self, window_days: u32) -> Option<u32> {
        self.presence_ratios
            .iter()
            .find(|r| r.window_days == window_days)
            .map(|r| r.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceEventType, LeaveType};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse::<DateTime<Utc>>().unwrap()
    }

    fn event(user: &str, event_type: AttendanceEventType, timestamp: &str) -> AttendanceEvent {
        AttendanceEvent {
            id: format!("{}_{}", user, timestamp),
            user_id: user.to_string(),
            event_type,
            timestamp: at(timestamp),
        }
    }

    fn leave(id: &str, user: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            user_id: user.to_string(),
            leave_type: LeaveType::Annual,
            custom_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            reason: None,
            status,
            approver_id: "leader".to_string(),
            rejection_reason: None,
            created_at: at("2024-06-01T00:00:00Z"),
            decided_at: None,
        }
    }

    #[test]
    fn test_team_metrics_only_count_members() {
        let members = vec!["alice".to_string(), "bob".to_string()];
        let events = vec![
            event("alice", AttendanceEventType::CheckIn, "2024-06-10T09:00:00Z"),
            event("alice", AttendanceEventType::CheckOut, "2024-06-10T17:00:00Z"),
            event("mallory", AttendanceEventType::CheckIn, "2024-06-10T09:00:00Z"),
            event("mallory", AttendanceEventType::CheckOut, "2024-06-10T19:00:00Z"),
        ];
        let requests = vec![
            leave("l1", "alice", LeaveStatus::Pending),
            leave("l2", "bob", LeaveStatus::Approved),
            leave("l3", "mallory", LeaveStatus::Pending),
        ];

        let metrics = TeamMetrics::compute(
            &AttendanceAggregator::with_timezone(Utc),
            &members,
            &events,
            &requests,
            &[7, 30],
            at("2024-06-12T12:00:00Z"),
        );

        assert_eq!(metrics.team_size, 2);
        assert_eq!(metrics.total_working_hours, Decimal::from_str("8.0").unwrap());
        assert_eq!(metrics.pending_leave_requests, 1);
        assert_eq!(metrics.ratio_for(7), Some(100));
        assert_eq!(metrics.ratio_for(30), Some(100));
        assert_eq!(metrics.ratio_for(90), None);
    }

    #[test]
    fn test_team_without_attendance_reports_zero() {
        let members = vec!["alice".to_string()];
        let metrics = TeamMetrics::compute(
            &AttendanceAggregator::with_timezone(Utc),
            &members,
            &[],
            &[],
            &[7],
            at("2024-06-12T12:00:00Z"),
        );

        assert_eq!(metrics.team_size, 1);
        assert_eq!(metrics.ratio_for(7), Some(0));
        assert_eq!(metrics.total_working_hours, Decimal::ZERO);
        assert_eq!(metrics.pending_leave_requests, 0);
    }
}
