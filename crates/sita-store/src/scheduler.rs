//! Defense scheduling: the conflict check and the transactional write that
//! binds an approved session to a date, room, and examining panel.

use std::collections::BTreeSet;

use rusqlite::{Connection, TransactionBehavior};
use sita_engine::conflict::{evaluate, ConflictReport};
use sita_engine::time::TimeRange;
use tracing::{info, warn};

use crate::db::{self, ScheduleStore};
use crate::dto::ScheduleRequest;
use crate::error::{Result, StoreError};
use crate::models::{ExamSession, SessionStatus};

/// Service for scheduling defense sessions. Holds a borrowed store handle;
/// construct one per request scope.
pub struct ExamScheduling<'a> {
    store: &'a ScheduleStore,
}

impl<'a> ExamScheduling<'a> {
    pub fn new(store: &'a ScheduleStore) -> Self {
        Self { store }
    }

    /// Dry-run the scheduling rules for a proposed binding.
    ///
    /// Resolves the session by its registration, assembles the committee to
    /// check (the thesis's supervisors plus the proposed examiners), and
    /// evaluates the room and committee rules. Read-only.
    ///
    /// # Errors
    /// `StoreError::NotFound` if no session exists for the registration.
    pub fn check_conflict(&self, request: &ScheduleRequest) -> Result<ConflictReport> {
        let proposed = request.time_range()?;
        let conn = self.store.lock();
        let (_, report) = conflict_check(&conn, request, proposed)?;
        Ok(report)
    }

    /// Bind an approved session to a date/time/room and assign its examining
    /// panel, atomically.
    ///
    /// The conflict rules run inside the same immediate transaction as the
    /// writes, so two concurrent attempts for an overlapping room or
    /// committee serialize at the database and the second sees the first's
    /// rows. On success the schedule row is inserted, prior examiner seats
    /// for the thesis are replaced by `examiner_ids` in list order, a
    /// history entry is appended, and the session is marked scheduled.
    ///
    /// # Errors
    /// - `StoreError::InvalidInput` for a malformed panel or time range,
    ///   before any query runs.
    /// - `StoreError::NotFound` if the registration or room is unknown.
    /// - `StoreError::Conflict` if a rule rejects the binding; no writes
    ///   are kept.
    pub fn create_schedule(
        &self,
        request: &ScheduleRequest,
        actor_id: Option<i64>,
    ) -> Result<ExamSession> {
        request.validate()?;
        let proposed = request.time_range()?;

        let mut conn = self.store.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (session, report) = conflict_check(&tx, request, proposed)?;
        if report.has_conflict {
            warn!(
                registration = request.registration_id,
                "schedule rejected: {}",
                report.messages.join(" ")
            );
            return Err(StoreError::Conflict(report.messages.join(" ")));
        }

        let room_name = db::room_name(&tx, request.room_id)?
            .ok_or_else(|| StoreError::NotFound(format!("no room {}", request.room_id)))?;

        db::insert_schedule(&tx, session.id, request.date, proposed, request.room_id)?;
        db::replace_examiners(&tx, session.thesis_id, &request.examiner_ids)?;

        let change = serde_json::json!({
            "action": "create_schedule",
            "date": request.date,
            "time": proposed.to_string(),
            "room": room_name,
            "examiners": request.examiner_ids,
        });
        db::insert_history(
            &tx,
            session.id,
            actor_id,
            &change.to_string(),
            "Initial defense scheduling",
        )?;
        db::set_session_status(&tx, session.id, SessionStatus::Scheduled)?;
        tx.commit()?;

        info!(
            session = session.id,
            date = %request.date,
            room = %room_name,
            "defense scheduled"
        );
        Ok(ExamSession {
            status: SessionStatus::Scheduled,
            ..session
        })
    }
}

/// Resolve the session and run both scheduling rules against the given
/// connection (plain reads or an open transaction).
fn conflict_check(
    conn: &Connection,
    request: &ScheduleRequest,
    proposed: TimeRange,
) -> Result<(ExamSession, ConflictReport)> {
    let session = db::session_by_registration(conn, request.registration_id)?.ok_or_else(|| {
        StoreError::NotFound(format!(
            "no exam session for registration {}",
            request.registration_id
        ))
    })?;

    // The committee to keep free: the supervisors already on the thesis plus
    // the proposed examiners, deduplicated.
    let mut committee: BTreeSet<i64> = db::committee_for_thesis(conn, session.thesis_id)?
        .into_iter()
        .filter(|seat| seat.role.is_supervisor())
        .map(|seat| seat.lecturer_id)
        .collect();
    committee.extend(request.examiner_ids.iter().copied());
    let committee: Vec<i64> = committee.into_iter().collect();

    let rooms = db::room_bookings(conn, request.date, request.room_id, Some(session.id))?;
    let panels = db::panel_bookings(conn, request.date, Some(session.id))?;

    Ok((session, evaluate(proposed, &rooms, &committee, &panels)))
}
