//! Attendance recording and team metrics.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use super::remote;
use crate::attendance::{AttendanceAggregator, TeamMetrics};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceEvent, AttendanceEventType};
use crate::store::{AttendanceQuery, LeaveQuery, RecordStore};

/// Records check-ins and check-outs and summarizes them per team.
#[derive(Clone)]
pub struct AttendanceService<Tz: TimeZone = Local> {
    store: Arc<dyn RecordStore>,
    config: Arc<ConfigLoader>,
    aggregator: AttendanceAggregator<Tz>,
}

impl AttendanceService<Local> {
    /// Creates a service that groups events by the local calendar day.
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigLoader>) -> Self {
        let aggregator = config.attendance_aggregator();
        Self {
            store,
            config,
            aggregator,
        }
    }
}

impl<Tz: TimeZone> AttendanceService<Tz> {
    /// Creates a service that groups events by calendar day in `timezone`.
    pub fn with_timezone(
        store: Arc<dyn RecordStore>,
        config: Arc<ConfigLoader>,
        timezone: Tz,
    ) -> Self {
        let aggregator = AttendanceAggregator::with_timezone(timezone)
            .with_max_workday_hours(config.config().attendance.max_workday_hours);
        Self {
            store,
            config,
            aggregator,
        }
    }

    /// Records a check-in or check-out for `actor` at `timestamp`.
    pub fn record(
        &self,
        actor: &Actor,
        event_type: AttendanceEventType,
        timestamp: DateTime<Utc>,
    ) -> EngineResult<AttendanceEvent> {
        let event = AttendanceEvent {
            id: Uuid::new_v4().to_string(),
            user_id: actor.user_id.clone(),
            event_type,
            timestamp,
        };

        remote(self.store.insert_attendance(event.clone()))?;
        info!(
            record_id = %event.id,
            user_id = %event.user_id,
            event_type = ?event.event_type,
            "Attendance recorded"
        );

        Ok(event)
    }

    /// Computes presence ratios for the configured windows, total worked
    /// hours and pending leave requests for `members`. Leaders and admins only.
    pub fn team_metrics(
        &self,
        actor: &Actor,
        members: &[String],
        now: DateTime<Utc>,
    ) -> EngineResult<TeamMetrics> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("view team metrics"));
        }

        let events = remote(self.store.fetch_attendance(&AttendanceQuery::for_users(members)))?;
        let leave_requests = remote(self.store.fetch_leave_requests(&LeaveQuery::for_users(members)))?;

        Ok(TeamMetrics::compute(
            &self.aggregator,
            members,
            &events,
            &leave_requests,
            self.config.presence_windows(),
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveRequest, LeaveStatus, LeaveType, Role};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn at(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    fn setup() -> (Arc<InMemoryStore>, AttendanceService<Utc>) {
        let store = Arc::new(InMemoryStore::new());
        let service = AttendanceService::with_timezone(
            store.clone(),
            Arc::new(ConfigLoader::default()),
            Utc,
        );
        (store, service)
    }

    fn leader() -> Actor {
        Actor::new("leader_001", Role::Leader)
    }

    fn pending_leave(id: &str, owner: &str) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            user_id: owner.to_string(),
            leave_type: LeaveType::Annual,
            custom_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            reason: None,
            status: LeaveStatus::Pending,
            approver_id: "leader".to_string(),
            rejection_reason: None,
            created_at: at("2024-06-01T00:00:00Z"),
            decided_at: None,
        }
    }

    #[test]
    fn test_record_stores_event_for_actor() {
        let (store, service) = setup();
        let alice = Actor::new("alice", Role::Staff);

        let event = service
            .record(&alice, AttendanceEventType::CheckIn, at("2024-06-10T08:55:00Z"))
            .unwrap();

        let stored = store.fetch_attendance(&AttendanceQuery::default()).unwrap();
        assert_eq!(stored, vec![event]);
    }

    #[test]
    fn test_team_metrics_from_recorded_events() {
        let (store, service) = setup();
        let alice = Actor::new("alice", Role::Staff);
        let outsider = Actor::new("zed", Role::Staff);

        service
            .record(&alice, AttendanceEventType::CheckIn, at("2024-06-10T08:55:00Z"))
            .unwrap();
        service
            .record(&alice, AttendanceEventType::CheckOut, at("2024-06-10T17:10:00Z"))
            .unwrap();
        service
            .record(&outsider, AttendanceEventType::CheckIn, at("2024-06-10T08:00:00Z"))
            .unwrap();
        service
            .record(&outsider, AttendanceEventType::CheckOut, at("2024-06-10T18:00:00Z"))
            .unwrap();
        store.insert_leave_request(pending_leave("l1", "bob")).unwrap();
        store.insert_leave_request(pending_leave("l2", "zed")).unwrap();

        let members = vec!["alice".to_string(), "bob".to_string()];
        let metrics = service
            .team_metrics(&leader(), &members, at("2024-06-11T12:00:00Z"))
            .unwrap();

        assert_eq!(metrics.team_size, 2);
        assert_eq!(metrics.total_working_hours, Decimal::new(83, 1));
        assert_eq!(metrics.pending_leave_requests, 1);
        assert_eq!(metrics.ratio_for(7), Some(100));
        assert_eq!(metrics.ratio_for(30), Some(100));
    }

    #[test]
    fn test_team_metrics_for_idle_team() {
        let (_, service) = setup();
        let members = vec!["alice".to_string()];

        let metrics = service
            .team_metrics(&leader(), &members, at("2024-06-11T12:00:00Z"))
            .unwrap();

        assert_eq!(metrics.total_working_hours, Decimal::ZERO);
        assert_eq!(metrics.ratio_for(7), Some(0));
        assert_eq!(metrics.pending_leave_requests, 0);
    }

    #[test]
    fn test_staff_cannot_view_team_metrics() {
        let (_, service) = setup();
        let members = vec!["alice".to_string()];

        let result = service.team_metrics(&Actor::new("alice", Role::Staff), &members, Utc::now());
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
    }

    #[test]
    fn test_record_surfaces_store_failure() {
        let (store, service) = setup();
        store.set_unavailable(true);

        let result = service.record(
            &Actor::new("alice", Role::Staff),
            AttendanceEventType::CheckIn,
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
