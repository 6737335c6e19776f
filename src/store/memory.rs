//! In-process record store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::{
    AttendanceQuery, BookingQuery, LeaveQuery, RecordStore, StoreError, StoreResult,
};
use crate::models::{AttendanceEvent, LeaveRequest, Notification, RoomBooking};

const LEAVE_REQUESTS: &str = "leave_requests";
const ROOM_BOOKINGS: &str = "room_bookings";

/// A [`RecordStore`] held in memory.
///
/// Each table sits behind its own `RwLock`. The store can be switched to
/// an unavailable state so that callers can exercise their failure paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    leave_requests: RwLock<Vec<LeaveRequest>>,
    bookings: RwLock<Vec<RoomBooking>>,
    attendance: RwLock<Vec<AttendanceEvent>>,
    notifications: RwLock<Vec<Notification>>,
    unavailable: AtomicBool,
    notifications_unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes notification inserts fail while other tables keep working.
    pub fn set_notifications_unavailable(&self, unavailable: bool) {
        self.notifications_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Notifications queued for `user_id`, oldest first.
    pub fn notifications_for(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let notifications = read(&self.notifications, "fetch notifications")?;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    fn ensure_available(&self, operation: &str) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                operation: operation.to_string(),
                message: "record store is offline".to_string(),
            });
        }
        Ok(())
    }

    fn read_table<'a, T>(
        &self,
        lock: &'a RwLock<T>,
        operation: &str,
    ) -> StoreResult<RwLockReadGuard<'a, T>> {
        self.ensure_available(operation)?;
        read(lock, operation)
    }

    fn write_table<'a, T>(
        &self,
        lock: &'a RwLock<T>,
        operation: &str,
    ) -> StoreResult<RwLockWriteGuard<'a, T>> {
        self.ensure_available(operation)?;
        lock.write().map_err(|_| poisoned(operation))
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, operation: &str) -> StoreResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| poisoned(operation))
}

fn poisoned(operation: &str) -> StoreError {
    StoreError::Unavailable {
        operation: operation.to_string(),
        message: "table lock poisoned".to_string(),
    }
}

fn replace_by_id<T>(
    rows: &mut [T],
    row: T,
    id_of: impl Fn(&T) -> &str,
    table: &'static str,
) -> StoreResult<()> {
    let id = id_of(&row).to_string();
    match rows.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => {
            *slot = row;
            Ok(())
        }
        None => Err(StoreError::NotFound { table, id }),
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_leave_requests(&self, query: &LeaveQuery) -> StoreResult<Vec<LeaveRequest>> {
        let rows = self.read_table(&self.leave_requests, "fetch leave_requests")?;
        let mut matching: Vec<LeaveRequest> =
            rows.iter().filter(|r| query.matches(r)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    fn get_leave_request(&self, id: &str) -> StoreResult<LeaveRequest> {
        let rows = self.read_table(&self.leave_requests, "fetch leave_requests")?;
        rows.iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: LEAVE_REQUESTS,
                id: id.to_string(),
            })
    }

    fn insert_leave_request(&self, request: LeaveRequest) -> StoreResult<()> {
        let mut rows = self.write_table(&self.leave_requests, "insert leave_requests")?;
        if rows.iter().any(|r| r.id == request.id) {
            return Err(StoreError::Duplicate {
                table: LEAVE_REQUESTS,
                id: request.id,
            });
        }
        debug!(record_id = %request.id, "Inserted leave request");
        rows.push(request);
        Ok(())
    }

    fn update_leave_request(&self, request: LeaveRequest) -> StoreResult<()> {
        let mut rows = self.write_table(&self.leave_requests, "update leave_requests")?;
        replace_by_id(&mut rows, request, |r| r.id.as_str(), LEAVE_REQUESTS)
    }

    fn delete_leave_request(&self, id: &str) -> StoreResult<()> {
        let mut rows = self.write_table(&self.leave_requests, "delete leave_requests")?;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound {
                table: LEAVE_REQUESTS,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn fetch_bookings(&self, query: &BookingQuery) -> StoreResult<Vec<RoomBooking>> {
        let rows = self.read_table(&self.bookings, "fetch room_bookings")?;
        let mut matching: Vec<RoomBooking> =
            rows.iter().filter(|b| query.matches(b)).cloned().collect();
        matching.sort_by_key(|b| b.start_time);
        Ok(matching)
    }

    fn get_booking(&self, id: &str) -> StoreResult<RoomBooking> {
        let rows = self.read_table(&self.bookings, "fetch room_bookings")?;
        rows.iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: ROOM_BOOKINGS,
                id: id.to_string(),
            })
    }

    fn insert_booking(&self, booking: RoomBooking) -> StoreResult<()> {
        let mut rows = self.write_table(&self.bookings, "insert room_bookings")?;
        if rows.iter().any(|b| b.id == booking.id) {
            return Err(StoreError::Duplicate {
                table: ROOM_BOOKINGS,
                id: booking.id,
            });
        }
        debug!(record_id = %booking.id, room_id = %booking.room_id, "Inserted booking");
        rows.push(booking);
        Ok(())
    }

    fn update_booking(&self, booking: RoomBooking) -> StoreResult<()> {
        let mut rows = self.write_table(&self.bookings, "update room_bookings")?;
        replace_by_id(&mut rows, booking, |b| b.id.as_str(), ROOM_BOOKINGS)
    }

    fn fetch_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceEvent>> {
        let rows = self.read_table(&self.attendance, "fetch attendance")?;
        Ok(rows.iter().filter(|e| query.matches(e)).cloned().collect())
    }

    fn insert_attendance(&self, event: AttendanceEvent) -> StoreResult<()> {
        let mut rows = self.write_table(&self.attendance, "insert attendance")?;
        rows.push(event);
        Ok(())
    }

    fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        if self.notifications_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                operation: "insert notifications".to_string(),
                message: "notifications table is offline".to_string(),
            });
        }
        let mut rows = self.write_table(&self.notifications, "insert notifications")?;
        rows.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, LeaveStatus, LeaveType};
    use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

    fn leave(id: &str, owner: &str, created_hour: u32) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            user_id: owner.to_string(),
            leave_type: LeaveType::Sick,
            custom_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            reason: None,
            status: LeaveStatus::Pending,
            approver_id: "leader".to_string(),
            rejection_reason: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, created_hour, 0, 0).unwrap(),
            decided_at: None,
        }
    }

    fn booking(id: &str, hour: u32) -> RoomBooking {
        let start_time = NaiveDateTime::parse_from_str(
            &format!("2024-06-10 {:02}:00", hour),
            "%Y-%m-%d %H:%M",
        )
        .unwrap();
        RoomBooking {
            id: id.to_string(),
            room_id: "room_a".to_string(),
            user_id: "owner".to_string(),
            title: "Sync".to_string(),
            description: None,
            start_time,
            end_time: start_time + Duration::hours(1),
            status: BookingStatus::Approved,
            attendees: Default::default(),
        }
    }

    #[test]
    fn test_insert_and_fetch_newest_first() {
        let store = InMemoryStore::new();
        store.insert_leave_request(leave("l1", "alice", 8)).unwrap();
        store.insert_leave_request(leave("l2", "alice", 10)).unwrap();
        store.insert_leave_request(leave("l3", "bob", 9)).unwrap();

        let alice = store
            .fetch_leave_requests(&LeaveQuery::for_user("alice"))
            .unwrap();
        let ids: Vec<&str> = alice.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["l2", "l1"]);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_leave_request(leave("l1", "alice", 8)).unwrap();

        let result = store.insert_leave_request(leave("l1", "alice", 9));
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[test]
    fn test_update_and_delete_missing_record() {
        let store = InMemoryStore::new();

        let update = store.update_leave_request(leave("ghost", "alice", 8));
        assert!(matches!(update, Err(StoreError::NotFound { .. })));

        let delete = store.delete_leave_request("ghost");
        assert!(matches!(delete, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_update_replaces_record() {
        let store = InMemoryStore::new();
        store.insert_leave_request(leave("l1", "alice", 8)).unwrap();

        let mut changed = store.get_leave_request("l1").unwrap();
        changed.status = LeaveStatus::Approved;
        store.update_leave_request(changed).unwrap();

        assert_eq!(
            store.get_leave_request("l1").unwrap().status,
            LeaveStatus::Approved
        );
    }

    #[test]
    fn test_bookings_sorted_by_start() {
        let store = InMemoryStore::new();
        store.insert_booking(booking("late", 14)).unwrap();
        store.insert_booking(booking("early", 9)).unwrap();

        let rows = store.fetch_bookings(&BookingQuery::default()).unwrap();
        assert_eq!(rows[0].id, "early");
        assert_eq!(rows[1].id, "late");
    }

    #[test]
    fn test_unavailable_store_fails_without_applying() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);

        let result = store.insert_leave_request(leave("l1", "alice", 8));
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));

        store.set_unavailable(false);
        assert!(
            store
                .fetch_leave_requests(&LeaveQuery::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_notifications_can_fail_independently() {
        let store = InMemoryStore::new();
        store.set_notifications_unavailable(true);

        let notification = Notification::leave_decision("alice", true);
        assert!(store.insert_notification(notification.clone()).is_err());
        assert!(store.insert_leave_request(leave("l1", "alice", 8)).is_ok());

        store.set_notifications_unavailable(false);
        store.insert_notification(notification).unwrap();
        assert_eq!(store.notifications_for("alice").unwrap().len(), 1);
    }
}
