//! Workforce engine for leave, room booking and attendance management
//!
//! This crate provides overlap detection for leave requests and room
//! bookings, attendance aggregation, leave balances, and the services and
//! HTTP API that apply them to stored records.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod balance;
pub mod config;
pub mod error;
pub mod interval;
pub mod models;
pub mod service;
pub mod store;
