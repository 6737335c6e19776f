//! Application state for the workforce engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::service::{AttendanceService, BookingService, LeaveService};
use crate::store::{InMemoryStore, RecordStore};

/// Shared application state.
///
/// Holds the loaded policy and the services, which all share one record
/// store.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    leave: LeaveService,
    bookings: BookingService,
    attendance: AttendanceService,
}

impl AppState {
    /// Creates a new application state over `store`.
    pub fn new(config: ConfigLoader, store: Arc<dyn RecordStore>) -> Self {
        let config = Arc::new(config);
        Self {
            leave: LeaveService::new(store.clone(), config.clone()),
            bookings: BookingService::new(store.clone(), config.clone()),
            attendance: AttendanceService::new(store, config.clone()),
            config,
        }
    }

    /// Creates a new application state backed by an empty in-memory store.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The leave request service.
    pub fn leave(&self) -> &LeaveService {
        &self.leave
    }

    /// The room booking service.
    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }

    /// The attendance service.
    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }
}
