//! Leave request workflow.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{notify, remote};
use crate::balance::{LeaveBalance, LeaveBalanceCounter};
use crate::config::ConfigLoader;
use crate::error::{ConflictKind, EngineError, EngineResult, ValidationRule};
use crate::interval::{IntervalSet, LeaveFilter, Span, TeamCalendar, month_window};
use crate::models::{Actor, LeaveRequest, LeaveStatus, LeaveType, Notification};
use crate::store::{LeaveQuery, RecordStore};

/// A new leave request as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    /// A standard leave type tag, `custom`, or the identifier of a custom type.
    #[serde(rename = "type", default)]
    pub leave_type: String,
    /// Identifier of a custom leave type, when `type` is `custom`.
    #[serde(default)]
    pub custom_type_id: Option<String>,
    /// First day of leave.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of leave (inclusive).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Optional reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who should decide on the request.
    #[serde(default)]
    pub approver_id: Option<String>,
}

/// Changes to a pending leave request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEdit {
    /// New first day of leave.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New last day of leave (inclusive).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New reason; `None` clears it.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Submits, edits, decides and withdraws leave requests.
#[derive(Clone)]
pub struct LeaveService {
    store: Arc<dyn RecordStore>,
    config: Arc<ConfigLoader>,
}

impl LeaveService {
    /// Creates a service over `store` with the given policy.
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ConfigLoader>) -> Self {
        Self { store, config }
    }

    /// Submits a new pending request for `actor`.
    ///
    /// Checks run in order: dates present, approver present, leave type,
    /// start on or before end, remaining balance, then overlap with the
    /// actor's pending and approved requests. The approver is notified
    /// once the request is stored.
    pub fn submit(
        &self,
        actor: &Actor,
        submission: LeaveSubmission,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        let (start_date, end_date) = required_dates(submission.start_date, submission.end_date)?;

        let approver_id = submission
            .approver_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                EngineError::validation(ValidationRule::MissingField, "Please select an approver")
            })?;

        if submission.leave_type.trim().is_empty() {
            return Err(EngineError::validation(
                ValidationRule::MissingField,
                "Please select a leave type",
            ));
        }
        let (leave_type, custom_type_id) =
            resolve_leave_type(&submission.leave_type, submission.custom_type_id)?;

        ensure_ordered(start_date, end_date)?;

        let owned = remote(
            self.store
                .fetch_leave_requests(&LeaveQuery::for_user(actor.user_id.as_str())),
        )?;

        let counter = self.config.balance_counter_for(&actor.user_id);
        counter.ensure_available(LeaveBalanceCounter::used_count(&owned, &actor.user_id))?;

        let candidate = Span::new(start_date, end_date);
        if let Some(existing) =
            IntervalSet::new(&owned, &LeaveStatus::QUALIFYING).first_conflict(&candidate)
        {
            return Err(EngineError::Conflict {
                kind: ConflictKind::LeaveDates,
                conflicting_id: existing.id.clone(),
            });
        }

        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            user_id: actor.user_id.clone(),
            leave_type,
            custom_type_id,
            start_date,
            end_date,
            reason: non_blank(submission.reason),
            status: LeaveStatus::Pending,
            approver_id,
            rejection_reason: None,
            created_at: now,
            decided_at: None,
        };

        remote(self.store.insert_leave_request(request.clone()))?;

        info!(
            record_id = %request.id,
            user_id = %request.user_id,
            approver_id = %request.approver_id,
            days = request.day_count(),
            "Leave request submitted"
        );

        notify(
            self.store.as_ref(),
            Notification::leave_request(
                &request.approver_id,
                &request.user_id,
                request.start_date,
                request.end_date,
            ),
        );

        Ok(request)
    }

    /// Changes the dates and reason of the actor's own pending request.
    ///
    /// The overlap check ignores the request being edited.
    pub fn edit(&self, actor: &Actor, id: &str, edit: LeaveEdit) -> EngineResult<LeaveRequest> {
        let mut request = remote(self.store.get_leave_request(id))?;

        if request.user_id != actor.user_id {
            return Err(EngineError::forbidden("edit another user's leave request"));
        }
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::forbidden(
                "edit a leave request that is no longer pending",
            ));
        }

        let (start_date, end_date) = required_dates(edit.start_date, edit.end_date)?;
        ensure_ordered(start_date, end_date)?;

        let owned = remote(
            self.store.fetch_leave_requests(
                &LeaveQuery::for_user(actor.user_id.as_str())
                    .with_statuses(&LeaveStatus::QUALIFYING)
                    .excluding(id),
            ),
        )?;

        let candidate = Span::new(start_date, end_date);
        if let Some(existing) =
            IntervalSet::new(&owned, &LeaveStatus::QUALIFYING).first_conflict(&candidate)
        {
            return Err(EngineError::Conflict {
                kind: ConflictKind::LeaveDates,
                conflicting_id: existing.id.clone(),
            });
        }

        request.start_date = start_date;
        request.end_date = end_date;
        request.reason = non_blank(edit.reason);

        remote(self.store.update_leave_request(request.clone()))?;
        info!(record_id = %request.id, user_id = %actor.user_id, "Leave request updated");

        Ok(request)
    }

    /// Approves a pending request. Leaders and admins only.
    pub fn approve(&self, actor: &Actor, id: &str, now: DateTime<Utc>) -> EngineResult<LeaveRequest> {
        self.decide(actor, id, LeaveStatus::Approved, None, now)
    }

    /// Rejects a pending request with an optional reason. Leaders and admins only.
    pub fn reject(
        &self,
        actor: &Actor,
        id: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        self.decide(actor, id, LeaveStatus::Rejected, non_blank(reason), now)
    }

    fn decide(
        &self,
        actor: &Actor,
        id: &str,
        to: LeaveStatus,
        rejection_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("decide on leave requests"));
        }

        let mut request = remote(self.store.get_leave_request(id))?;
        request.status = request.status.transition(to)?;
        request.approver_id = actor.user_id.clone();
        request.decided_at = Some(now);
        if to == LeaveStatus::Rejected {
            request.rejection_reason = rejection_reason;
        }

        remote(self.store.update_leave_request(request.clone()))?;

        info!(
            record_id = %request.id,
            user_id = %request.user_id,
            decided_by = %actor.user_id,
            status = %request.status,
            "Leave request decided"
        );

        notify(
            self.store.as_ref(),
            Notification::leave_decision(&request.user_id, to == LeaveStatus::Approved),
        );

        Ok(request)
    }

    /// Deletes a pending request. Owners and admins only.
    pub fn withdraw(&self, actor: &Actor, id: &str) -> EngineResult<()> {
        let request = remote(self.store.get_leave_request(id))?;

        if !actor.owns_or_admin(&request.user_id) {
            return Err(EngineError::forbidden("withdraw another user's leave request"));
        }
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::forbidden(
                "withdraw a leave request that is no longer pending",
            ));
        }

        remote(self.store.delete_leave_request(id))?;
        info!(record_id = %id, user_id = %actor.user_id, "Leave request withdrawn");
        Ok(())
    }

    /// The remaining allowance of `user_id`.
    pub fn balance(&self, user_id: &str) -> EngineResult<LeaveBalance> {
        let owned = remote(self.store.fetch_leave_requests(&LeaveQuery::for_user(user_id)))?;
        Ok(self.config.balance_counter_for(user_id).balance(&owned, user_id))
    }

    /// The actor's own requests, newest first, narrowed by `filter`.
    pub fn history(&self, actor: &Actor, filter: &LeaveFilter) -> EngineResult<Vec<LeaveRequest>> {
        let owned = remote(
            self.store
                .fetch_leave_requests(&LeaveQuery::for_user(actor.user_id.as_str())),
        )?;
        Ok(filter.apply(&owned).into_iter().cloned().collect())
    }

    /// Every request of `members` touching the given month, in any status.
    /// Leaders and admins only.
    pub fn team_calendar(
        &self,
        actor: &Actor,
        members: &[String],
        year: i32,
        month: u32,
    ) -> EngineResult<TeamCalendar> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("view the team leave calendar"));
        }
        if month_window(year, month).is_none() {
            return Err(invalid_month());
        }

        let requests = remote(self.store.fetch_leave_requests(&LeaveQuery::for_users(members)))?;
        TeamCalendar::for_month(&requests, year, month).ok_or_else(invalid_month)
    }

    /// Pending requests of `members`, newest first. Leaders and admins only.
    pub fn pending_for_team(&self, actor: &Actor, members: &[String]) -> EngineResult<Vec<LeaveRequest>> {
        if !actor.role.can_decide() {
            return Err(EngineError::forbidden("view the team's pending leave requests"));
        }

        remote(
            self.store.fetch_leave_requests(
                &LeaveQuery::for_users(members).with_statuses(&[LeaveStatus::Pending]),
            ),
        )
    }
}

/// Reads the leave type from a selected tag and an optional custom type id.
///
/// A custom id given as the tag itself must agree with `custom_type_id`.
fn resolve_leave_type(
    selection: &str,
    custom_type_id: Option<String>,
) -> EngineResult<(LeaveType, Option<String>)> {
    let (leave_type, selected) = LeaveType::from_selection(selection);
    let given = non_blank(custom_type_id).map(|id| id.trim().to_string());

    let reference = match (selected, given) {
        (Some(selected), Some(given)) if selected != given => {
            return Err(EngineError::validation(
                ValidationRule::InvalidLeaveType,
                "Leave type and custom leave type do not match",
            ));
        }
        (selected, given) => selected.or(given),
    };

    leave_type.validate_reference(reference.as_deref())?;
    Ok((leave_type, reference))
}

fn invalid_month() -> EngineError {
    EngineError::validation(ValidationRule::InvalidMonth, "Month must be between 1 and 12")
}

fn required_dates(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> EngineResult<(NaiveDate, NaiveDate)> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(EngineError::validation(
            ValidationRule::MissingField,
            "Start date and end date are required",
        )),
    }
}

fn ensure_ordered(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<()> {
    if start_date > end_date {
        return Err(EngineError::validation(
            ValidationRule::StartAfterEnd,
            "Start date must be before or equal to end date",
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
