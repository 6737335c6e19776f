//! HTTP request handlers for the workforce engine API.
//!
//! This module contains the handler functions for all API endpoints.
//! Handlers identify the caller from the `x-user-id` and `x-user-role`
//! headers, parse the body, call one service operation and map the result.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult, ValidationRule};
use crate::interval::{IntervalBounds, IntervalSet, LeaveFilter, Scheduled, Span};
use crate::models::{Actor, BookingStatus, LeaveStatus, Role};
use crate::service::{BookingDraft, LeaveEdit, LeaveSubmission};

use super::request::{
    AttendanceRequest, AttendeeRequest, BookingConflictRequest, LeaveConflictRequest,
    RejectRequest, TeamCalendarRequest, TeamMetricsRequest,
};
use super::response::{ApiError, ApiErrorResponse, ConflictCheckResponse};
use super::state::AppState;

/// Header carrying the current user's identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the current user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/leave-requests",
            post(submit_leave_handler).get(leave_history_handler),
        )
        .route(
            "/leave-requests/:id",
            put(edit_leave_handler).delete(withdraw_leave_handler),
        )
        .route("/leave-requests/:id/approve", post(approve_leave_handler))
        .route("/leave-requests/:id/reject", post(reject_leave_handler))
        .route("/leave-balance", get(leave_balance_handler))
        .route("/bookings", post(create_booking_handler))
        .route("/bookings/:id", put(edit_booking_handler))
        .route("/bookings/:id/approve", post(approve_booking_handler))
        .route("/bookings/:id/reject", post(reject_booking_handler))
        .route("/bookings/:id/cancel", post(cancel_booking_handler))
        .route("/bookings/:id/attendees", post(add_attendee_handler))
        .route(
            "/bookings/:id/attendees/:user_id",
            delete(remove_attendee_handler),
        )
        .route("/attendance", post(record_attendance_handler))
        .route("/metrics/team", post(team_metrics_handler))
        .route("/team/leave-calendar", post(team_calendar_handler))
        .route(
            "/team/pending-leave-requests",
            post(team_pending_leave_handler),
        )
        .route("/check/leave-conflict", post(leave_conflict_handler))
        .route("/check/booking-conflict", post(booking_conflict_handler))
        .with_state(state)
}

// =============================================================================
// Leave requests
// =============================================================================

/// Handler for POST /leave-requests.
async fn submit_leave_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LeaveSubmission>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing leave submission");

    let (actor, submission) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::CREATED,
        state.leave().submit(&actor, submission, Utc::now()),
    )
}

/// Handler for GET /leave-requests.
async fn leave_history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    filter: Result<Query<LeaveFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing leave history request");

    let actor = match identify(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let filter = match filter {
        Ok(Query(filter)) => filter,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query");
            return error_body(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().history(&actor, &filter),
    )
}

/// Handler for PUT /leave-requests/:id.
async fn edit_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<LeaveEdit>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing leave edit");

    let (actor, edit) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().edit(&actor, &id, edit),
    )
}

/// Handler for DELETE /leave-requests/:id.
async fn withdraw_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing leave withdrawal");

    let actor = match identify(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match state.leave().withdraw(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /leave-requests/:id/approve.
async fn approve_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing leave approval");

    let actor = match identify(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().approve(&actor, &id, Utc::now()),
    )
}

/// Handler for POST /leave-requests/:id/reject.
async fn reject_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing leave rejection");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().reject(&actor, &id, body.reason, Utc::now()),
    )
}

/// Handler for GET /leave-balance.
async fn leave_balance_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let correlation_id = Uuid::new_v4();

    let actor = match identify(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, user_id = %actor.user_id, "Processing balance request");

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().balance(&actor.user_id),
    )
}

// =============================================================================
// Room bookings
// =============================================================================

/// Handler for POST /bookings.
async fn create_booking_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing booking request");

    let (actor, draft) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::CREATED,
        state.bookings().create(&actor, draft),
    )
}

/// Handler for PUT /bookings/:id.
async fn edit_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing booking edit");

    let (actor, draft) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.bookings().edit(&actor, &id, draft),
    )
}

/// Handler for POST /bookings/:id/approve.
async fn approve_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing booking approval");

    match identify(&headers) {
        Ok(actor) => respond(
            correlation_id,
            StatusCode::OK,
            state.bookings().approve(&actor, &id),
        ),
        Err(response) => response,
    }
}

/// Handler for POST /bookings/:id/reject.
async fn reject_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing booking rejection");

    match identify(&headers) {
        Ok(actor) => respond(
            correlation_id,
            StatusCode::OK,
            state.bookings().reject(&actor, &id),
        ),
        Err(response) => response,
    }
}

/// Handler for POST /bookings/:id/cancel.
async fn cancel_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing booking cancellation");

    match identify(&headers) {
        Ok(actor) => respond(
            correlation_id,
            StatusCode::OK,
            state.bookings().cancel(&actor, &id),
        ),
        Err(response) => response,
    }
}

/// Handler for POST /bookings/:id/attendees.
async fn add_attendee_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<AttendeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing attendee addition");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.bookings().add_attendee(&actor, &id, &body.user_id),
    )
}

/// Handler for DELETE /bookings/:id/attendees/:user_id.
async fn remove_attendee_handler(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing attendee removal");

    match identify(&headers) {
        Ok(actor) => respond(
            correlation_id,
            StatusCode::OK,
            state.bookings().remove_attendee(&actor, &id, &user_id),
        ),
        Err(response) => response,
    }
}

// =============================================================================
// Attendance
// =============================================================================

/// Handler for POST /attendance.
async fn record_attendance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance event");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    let timestamp = body.timestamp.unwrap_or_else(Utc::now);
    respond(
        correlation_id,
        StatusCode::CREATED,
        state.attendance().record(&actor, body.event_type, timestamp),
    )
}

/// Handler for POST /metrics/team.
async fn team_metrics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TeamMetricsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing team metrics request");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state
            .attendance()
            .team_metrics(&actor, &body.members, Utc::now()),
    )
}

/// Handler for POST /team/leave-calendar.
async fn team_calendar_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TeamCalendarRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing team leave calendar request");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state
            .leave()
            .team_calendar(&actor, &body.members, body.year, body.month),
    )
}

/// Handler for POST /team/pending-leave-requests.
async fn team_pending_leave_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TeamMetricsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing team pending leave request");

    let (actor, body) = match (identify(&headers), parse_body(payload, correlation_id)) {
        (Ok(actor), Ok(body)) => (actor, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().pending_for_team(&actor, &body.members),
    )
}

// =============================================================================
// Stateless conflict checks
// =============================================================================

/// Handler for POST /check/leave-conflict.
///
/// Checks the candidate against the supplied records with inclusive day
/// ranges, counting pending and approved requests.
async fn leave_conflict_handler(
    payload: Result<Json<LeaveConflictRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match parse_body(payload, correlation_id) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let result = check_conflicts(
        &request.existing,
        &LeaveStatus::QUALIFYING,
        Span::new(request.start_date, request.end_date),
        request.exclude_id.as_deref(),
        ValidationRule::StartAfterEnd,
    );
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /check/booking-conflict.
///
/// Checks the candidate against the supplied records with half-open time
/// ranges, counting approved bookings only.
async fn booking_conflict_handler(
    payload: Result<Json<BookingConflictRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match parse_body(payload, correlation_id) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let result = check_conflicts(
        &request.existing,
        &BookingStatus::HOLDS_ROOM,
        Span::new(request.start_time, request.end_time),
        request.exclude_id.as_deref(),
        ValidationRule::EmptyTimeRange,
    );
    respond(correlation_id, StatusCode::OK, result)
}

fn check_conflicts<R: Scheduled>(
    existing: &[R],
    statuses: &[R::Status],
    candidate: Span<R::Point>,
    exclude_id: Option<&str>,
    malformed: ValidationRule,
) -> EngineResult<ConflictCheckResponse> {
    if !candidate.is_well_formed(R::BOUNDS) {
        let message = match R::BOUNDS {
            IntervalBounds::Inclusive => "Start date must be before or equal to end date",
            IntervalBounds::HalfOpen => "End time must be after start time",
        };
        return Err(EngineError::validation(malformed, message));
    }

    let mut set = IntervalSet::new(existing, statuses);
    if let Some(id) = exclude_id {
        set = set.excluding(id);
    }

    let conflicting_ids: Vec<String> = set
        .conflicts(&candidate)
        .into_iter()
        .map(|record| record.record_id().to_string())
        .collect();

    Ok(ConflictCheckResponse {
        conflict: !conflicting_ids.is_empty(),
        conflicting_ids,
    })
}

// =============================================================================
// Shared plumbing
// =============================================================================

/// Reads the acting user from the identity headers.
fn identify(headers: &HeaderMap) -> Result<Actor, Response> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| error_body(StatusCode::BAD_REQUEST, ApiError::missing_identity()))?;

    let role = match headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| error_body(StatusCode::BAD_REQUEST, ApiError::invalid_role(raw)))?,
        None => Role::default(),
    };

    Ok(Actor::new(user_id, role))
}

/// Unwraps a JSON body, turning extractor rejections into error responses.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // Get the body text which contains the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(error_body(StatusCode::BAD_REQUEST, error))
        }
    }
}

/// Serializes a service result.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    status: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(correlation_id = %correlation_id, status = status.as_u16(), "Request completed");
            (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    error_body(api_error.status, api_error.error)
}

fn error_body(status: StatusCode, error: ApiError) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}
