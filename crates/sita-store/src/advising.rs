//! Advising-session scheduling: conflict detection against a supervisor's
//! commitments, open-slot suggestion, and booking.

use chrono::NaiveDate;
use rusqlite::TransactionBehavior;
use sita_engine::slots::{suggest_slots, SlotWindow};
use sita_engine::time::{ClockTime, TimeRange};
use tracing::info;

use crate::db::{self, ScheduleStore};
use crate::error::{Result, StoreError};
use crate::models::{AdvisingSession, AdvisingStatus};

/// Advising sessions are stored as bare start times and occupy one hour.
pub const ADVISING_BLOCK_MINUTES: u16 = 60;

/// Service for supervisors' advising calendars. Holds a borrowed store
/// handle; construct one per request scope.
pub struct AdvisingScheduling<'a> {
    store: &'a ScheduleStore,
}

impl<'a> AdvisingScheduling<'a> {
    pub fn new(store: &'a ScheduleStore) -> Self {
        Self { store }
    }

    /// Whether the lecturer already has a commitment overlapping a block of
    /// `duration_minutes` (default one hour) starting at `start` on `date`.
    ///
    /// Commitments are their scheduled advising sessions and any defense
    /// they sit on; cancelled and completed advising sessions do not count.
    pub fn has_conflict(
        &self,
        lecturer_id: i64,
        date: NaiveDate,
        start: ClockTime,
        duration_minutes: Option<u16>,
    ) -> Result<bool> {
        let duration = duration_minutes.unwrap_or(ADVISING_BLOCK_MINUTES);
        let proposed = TimeRange::with_duration(start, duration)?;

        let conn = self.store.lock();
        let busy = db::lecturer_blocks(&conn, lecturer_id, date)?;
        Ok(busy.iter().any(|block| block.overlaps(&proposed)))
    }

    /// Open slots in the lecturer's working day.
    ///
    /// A lecturer unknown to the system has no commitments and gets the full
    /// slot list; no existence check is performed.
    pub fn available_slots(
        &self,
        lecturer_id: i64,
        date: NaiveDate,
        window: &SlotWindow,
    ) -> Result<Vec<ClockTime>> {
        let conn = self.store.lock();
        let busy = db::lecturer_blocks(&conn, lecturer_id, date)?;
        Ok(suggest_slots(window, &busy))
    }

    /// Book a one-hour advising appointment for a thesis.
    ///
    /// Only a supervisor of the thesis may book; the booking is rejected if
    /// it overlaps any of their scheduled advising sessions or defenses.
    /// The role check, the conflict scan, and the insert share one immediate
    /// transaction.
    ///
    /// # Errors
    /// - `StoreError::InvalidInput` if the lecturer does not supervise the
    ///   thesis.
    /// - `StoreError::Conflict` naming the clashing commitment.
    pub fn book_session(
        &self,
        thesis_id: i64,
        lecturer_id: i64,
        date: NaiveDate,
        start: ClockTime,
    ) -> Result<AdvisingSession> {
        let proposed = TimeRange::with_duration(start, ADVISING_BLOCK_MINUTES)?;

        let mut conn = self.store.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let role = db::role_on_thesis(&tx, thesis_id, lecturer_id)?
            .filter(|role| role.is_supervisor())
            .ok_or_else(|| {
                StoreError::InvalidInput(
                    "only a supervisor of this thesis can book advising sessions".to_string(),
                )
            })?;

        for block in db::advising_blocks(&tx, lecturer_id, date)? {
            if block.overlaps(&proposed) {
                return Err(StoreError::Conflict(format!(
                    "clashes with another advising session at {}",
                    block.start
                )));
            }
        }
        for block in db::defense_blocks(&tx, lecturer_id, date)? {
            if block.overlaps(&proposed) {
                return Err(StoreError::Conflict(format!(
                    "clashes with a defense at {}",
                    block
                )));
            }
        }

        let id = db::insert_advising(&tx, thesis_id, lecturer_id, role, date, start)?;
        tx.commit()?;

        info!(
            thesis = thesis_id,
            lecturer = lecturer_id,
            date = %date,
            start = %start,
            "advising session booked"
        );
        Ok(AdvisingSession {
            id,
            thesis_id,
            lecturer_id,
            role,
            date,
            start,
            status: AdvisingStatus::Scheduled,
        })
    }
}
