//! Application services.
//!
//! Each operation follows the same shape: fetch the records it needs from
//! the [`RecordStore`], run the pure checks over the fetched collections,
//! then perform a single write. Validation and conflict failures stop the
//! operation before anything is written.
//!
//! Nothing serializes the fetch and the write, so two concurrent
//! submissions may both pass the conflict check.

mod attendance;
mod booking;
mod leave;

pub use attendance::AttendanceService;
pub use booking::{BookingDraft, BookingService};
pub use leave::{LeaveEdit, LeaveService, LeaveSubmission};

use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::Notification;
use crate::store::{RecordStore, StoreError, StoreResult};

/// Converts a store result, logging failures before they are surfaced.
fn remote<T>(result: StoreResult<T>) -> EngineResult<T> {
    result.map_err(|error| {
        match &error {
            StoreError::NotFound { table, id } => {
                debug!(table = %table, record_id = %id, "Record not found");
            }
            other => warn!(error = %other, "Record store operation failed"),
        }
        EngineError::from(error)
    })
}

/// Queues a notification; failures are logged and skipped.
fn notify(store: &dyn RecordStore, notification: Notification) {
    let recipient = notification.user_id.clone();
    if let Err(error) = store.insert_notification(notification) {
        warn!(user_id = %recipient, error = %error, "Notification creation skipped");
    }
}
