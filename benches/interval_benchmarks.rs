//! Performance benchmarks for the workforce engine.
//!
//! Covers the pure functions that run on every write and dashboard load,
//! plus one request through the router:
//! - Leave conflict check against a user's history
//! - Room conflict check against a busy day
//! - Worked hours over a month of team attendance
//! - Stateless conflict check endpoint
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use workforce_engine::api::{AppState, ExistingBooking, ExistingLeave, create_router};
use workforce_engine::attendance::AttendanceAggregator;
use workforce_engine::config::ConfigLoader;
use workforce_engine::interval::{Span, has_conflict};
use workforce_engine::models::{AttendanceEvent, AttendanceEventType, BookingStatus, LeaveStatus};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Creates `count` two-day leave ranges, one every week.
fn create_leave_history(count: usize) -> Vec<ExistingLeave> {
    (0..count)
        .map(|i| {
            let start = base_date() + Duration::weeks(i as i64);
            ExistingLeave {
                id: format!("leave_{}", i),
                start_date: start,
                end_date: start + Duration::days(1),
                status: if i % 3 == 0 {
                    LeaveStatus::Rejected
                } else {
                    LeaveStatus::Approved
                },
            }
        })
        .collect()
}

/// Creates `count` back-to-back 15 minute bookings from 08:00.
fn create_busy_day(count: usize) -> Vec<ExistingBooking> {
    let opening = base_date().and_hms_opt(8, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let start: NaiveDateTime = opening + Duration::minutes(15 * i as i64);
            ExistingBooking {
                id: format!("booking_{}", i),
                start_time: start,
                end_time: start + Duration::minutes(15),
                status: BookingStatus::Approved,
            }
        })
        .collect()
}

/// Creates a check-in and check-out per member per day for 30 days.
fn create_team_month(members: usize) -> Vec<AttendanceEvent> {
    let first = Utc.with_ymd_and_hms(2024, 6, 1, 8, 55, 0).unwrap();
    let mut events = Vec::with_capacity(members * 60);
    for member in 0..members {
        for day in 0..30 {
            let check_in = first + Duration::days(day);
            for (event_type, at) in [
                (AttendanceEventType::CheckIn, check_in),
                (AttendanceEventType::CheckOut, check_in + Duration::minutes(495)),
            ] {
                events.push(AttendanceEvent {
                    id: format!("{}_{}_{:?}", member, day, event_type),
                    user_id: format!("user_{}", member),
                    event_type,
                    timestamp: at,
                });
            }
        }
    }
    events
}

/// Benchmark: leave conflict check against histories of growing length.
fn bench_leave_conflict(c: &mut Criterion) {
    let mut group = c.benchmark_group("leave_conflict");

    for count in [12, 52, 520].iter() {
        let existing = create_leave_history(*count);
        let last = base_date() + Duration::weeks(*count as i64);
        let candidate = Span::new(last, last + Duration::days(2));

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("records", count), count, |b, _| {
            b.iter(|| {
                black_box(has_conflict(
                    black_box(&candidate),
                    &existing,
                    &LeaveStatus::QUALIFYING,
                ))
            })
        });
    }

    group.finish();
}

/// Benchmark: room conflict check on a fully booked day.
fn bench_room_conflict(c: &mut Criterion) {
    let existing = create_busy_day(40);
    let noon = base_date().and_hms_opt(12, 0, 0).unwrap();
    let candidate = Span::new(noon, noon + Duration::minutes(30));

    c.bench_function("room_conflict_busy_day", |b| {
        b.iter(|| {
            black_box(has_conflict(
                black_box(&candidate),
                &existing,
                &BookingStatus::HOLDS_ROOM,
            ))
        })
    });
}

/// Benchmark: total worked hours for a team's month of events.
fn bench_worked_hours(c: &mut Criterion) {
    let aggregator = AttendanceAggregator::with_timezone(Utc);
    let mut group = c.benchmark_group("worked_hours");

    for members in [1, 10, 50].iter() {
        let events = create_team_month(*members);

        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(BenchmarkId::new("members", members), members, |b, _| {
            b.iter(|| black_box(aggregator.total_worked_hours(black_box(&events))))
        });
    }

    group.finish();
}

/// Benchmark: stateless booking conflict check through the router.
fn bench_conflict_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let router = create_router(AppState::in_memory(config));
    let body = serde_json::json!({
        "start_time": "2024-01-01T12:00:00",
        "end_time": "2024-01-01T12:30:00",
        "existing": create_busy_day(40),
    })
    .to_string();

    c.bench_function("booking_conflict_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/check/booking-conflict")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_leave_conflict,
    bench_room_conflict,
    bench_worked_hours,
    bench_conflict_endpoint,
);
criterion_main!(benches);
