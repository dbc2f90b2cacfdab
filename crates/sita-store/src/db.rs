//! SQLite-backed storage for defense schedules and advising sessions.
//!
//! A single connection behind a mutex, initialized from the bundled schema.
//! Read queries fetch the rows relevant to one date; the engine crate owns
//! the overlap decisions. Query helpers take a plain `&Connection` so the
//! write paths can reuse them inside a transaction.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use sita_engine::conflict::{CommitteeMember, PanelBooking, RoomBooking};
use sita_engine::time::{ClockTime, TimeRange, MINUTES_PER_DAY};

use crate::advising::ADVISING_BLOCK_MINUTES;
use crate::error::{Result, StoreError};
use crate::models::{
    AdvisingStatus, CommitteeSeat, ExamSchedule, ExamSession, HistoryEntry, Role, SessionStatus,
};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Handle to the scheduling database. Services receive a reference to this
/// rather than opening their own connections.
pub struct ScheduleStore {
    conn: Mutex<Connection>,
}

impl ScheduleStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// An in-memory database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("schedule store mutex poisoned")
    }

    // ---- directory setup -------------------------------------------------
    //
    // Students, lecturers, rooms, and theses are owned by the wider academic
    // information system; these helpers exist so deployments and tests can
    // seed the scheduling database.

    pub fn add_student(&self, name: &str) -> Result<i64> {
        let conn = self.lock();
        conn.execute("INSERT INTO students (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_lecturer(&self, name: &str) -> Result<i64> {
        let conn = self.lock();
        conn.execute("INSERT INTO lecturers (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_room(&self, name: &str) -> Result<i64> {
        let conn = self.lock();
        conn.execute("INSERT INTO rooms (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_thesis(&self, student_id: i64, title: &str) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO theses (student_id, title) VALUES (?1, ?2)",
            params![student_id, title],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn assign_role(&self, thesis_id: i64, lecturer_id: i64, role: Role) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO committee_roles (thesis_id, lecturer_id, role) VALUES (?1, ?2, ?3)",
            params![thesis_id, lecturer_id, role.as_str()],
        )?;
        Ok(())
    }

    /// Record an approved defense registration as a session awaiting a
    /// schedule.
    pub fn register_session(&self, thesis_id: i64, registration_id: i64) -> Result<ExamSession> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO exam_sessions (thesis_id, registration_id, status) VALUES (?1, ?2, ?3)",
            params![thesis_id, registration_id, SessionStatus::Registered.as_str()],
        )?;
        Ok(ExamSession {
            id: conn.last_insert_rowid(),
            thesis_id,
            registration_id,
            status: SessionStatus::Registered,
        })
    }

    // ---- reads -----------------------------------------------------------

    pub fn session_by_registration(&self, registration_id: i64) -> Result<Option<ExamSession>> {
        session_by_registration(&self.lock(), registration_id)
    }

    pub fn schedules_for_session(&self, session_id: i64) -> Result<Vec<ExamSchedule>> {
        schedules_for_session(&self.lock(), session_id)
    }

    /// All of a lecturer's commitments on a date: scheduled advising blocks
    /// plus the defenses they sit on.
    pub fn lecturer_blocks(&self, lecturer_id: i64, date: NaiveDate) -> Result<Vec<TimeRange>> {
        lecturer_blocks(&self.lock(), lecturer_id, date)
    }

    /// Committee seats currently assigned on a thesis.
    pub fn committee(&self, thesis_id: i64) -> Result<Vec<CommitteeSeat>> {
        committee_for_thesis(&self.lock(), thesis_id)
    }

    pub fn history_for_session(&self, session_id: i64) -> Result<Vec<HistoryEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, actor_id, change, reason
             FROM schedule_history WHERE session_id = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    actor_id: row.get(2)?,
                    change: row.get(3)?,
                    reason: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Update an advising session's lifecycle status (cancellation,
    /// completion).
    pub fn set_advising_status(&self, advising_id: i64, status: AdvisingStatus) -> Result<()> {
        let conn = self.lock();
        let updated = conn.execute(
            "UPDATE advising_sessions SET status = ?1 WHERE id = ?2",
            params![status.as_str(), advising_id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!(
                "no advising session {}",
                advising_id
            )));
        }
        Ok(())
    }
}

/// Convert a stored minutes-from-midnight offset into a clock time.
fn clock(minutes: i64) -> Result<ClockTime> {
    let offset = u16::try_from(minutes).unwrap_or(u16::MAX);
    Ok(ClockTime::from_minutes(offset)?)
}

fn stored_range(start: i64, end: i64) -> Result<TimeRange> {
    Ok(TimeRange::new(clock(start)?, clock(end)?)?)
}

/// An advising session's one-hour block, clipped to the end of the day for
/// starts within an hour of midnight.
fn advising_block(start: ClockTime) -> Result<TimeRange> {
    match TimeRange::with_duration(start, ADVISING_BLOCK_MINUTES) {
        Ok(range) => Ok(range),
        Err(_) => Ok(TimeRange::new(
            start,
            ClockTime::from_minutes(MINUTES_PER_DAY - 1)?,
        )?),
    }
}

pub(crate) fn session_by_registration(
    conn: &Connection,
    registration_id: i64,
) -> Result<Option<ExamSession>> {
    let row = conn
        .query_row(
            "SELECT id, thesis_id, registration_id, status
             FROM exam_sessions WHERE registration_id = ?1",
            params![registration_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, thesis_id, registration_id, status)| {
        let status = SessionStatus::parse(&status).ok_or_else(|| {
            StoreError::InvalidInput(format!("unknown session status '{}'", status))
        })?;
        Ok(ExamSession {
            id,
            thesis_id,
            registration_id,
            status,
        })
    })
    .transpose()
}

pub(crate) fn schedules_for_session(
    conn: &Connection,
    session_id: i64,
) -> Result<Vec<ExamSchedule>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, date, start_minutes, end_minutes, room_id
         FROM exam_schedules WHERE session_id = ?1 ORDER BY date, start_minutes",
    )?;
    let rows = stmt
        .query_map(params![session_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, NaiveDate>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(id, session_id, date, start, end, room_id)| {
            Ok(ExamSchedule {
                id,
                session_id,
                date,
                time: stored_range(start, end)?,
                room_id,
            })
        })
        .collect()
}

/// Bookings of `room_id` on `date`, excluding the session being scheduled so
/// a reschedule does not collide with itself.
pub(crate) fn room_bookings(
    conn: &Connection,
    date: NaiveDate,
    room_id: i64,
    exclude_session: Option<i64>,
) -> Result<Vec<RoomBooking>> {
    let mut stmt = conn.prepare(
        "SELECT es.session_id, r.name, st.name, es.start_minutes, es.end_minutes
         FROM exam_schedules es
         JOIN exam_sessions s ON s.id = es.session_id
         JOIN theses t        ON t.id = s.thesis_id
         JOIN students st     ON st.id = t.student_id
         JOIN rooms r         ON r.id = es.room_id
         WHERE es.date = ?1 AND es.room_id = ?2
           AND (?3 IS NULL OR es.session_id <> ?3)
         ORDER BY es.start_minutes",
    )?;
    let rows = stmt
        .query_map(params![date, room_id, exclude_session], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(session_id, room_name, student_name, start, end)| {
            Ok(RoomBooking {
                session_id,
                room_name,
                student_name,
                range: stored_range(start, end)?,
            })
        })
        .collect()
}

/// Every schedule on `date` (excluding the session being scheduled), carried
/// with its full committee for membership-intersection checks.
pub(crate) fn panel_bookings(
    conn: &Connection,
    date: NaiveDate,
    exclude_session: Option<i64>,
) -> Result<Vec<PanelBooking>> {
    let mut stmt = conn.prepare(
        "SELECT es.session_id, s.thesis_id, es.start_minutes, es.end_minutes
         FROM exam_schedules es
         JOIN exam_sessions s ON s.id = es.session_id
         WHERE es.date = ?1 AND (?2 IS NULL OR es.session_id <> ?2)
         ORDER BY es.start_minutes",
    )?;
    let rows = stmt
        .query_map(params![date, exclude_session], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut bookings = Vec::with_capacity(rows.len());
    for (session_id, thesis_id, start, end) in rows {
        let mut member_stmt = conn.prepare(
            "SELECT cr.lecturer_id, l.name
             FROM committee_roles cr
             JOIN lecturers l ON l.id = cr.lecturer_id
             WHERE cr.thesis_id = ?1
             ORDER BY cr.role",
        )?;
        let committee = member_stmt
            .query_map(params![thesis_id], |row| {
                Ok(CommitteeMember {
                    lecturer_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        bookings.push(PanelBooking {
            session_id,
            thesis_id,
            range: stored_range(start, end)?,
            committee,
        });
    }
    Ok(bookings)
}

pub(crate) fn committee_for_thesis(conn: &Connection, thesis_id: i64) -> Result<Vec<CommitteeSeat>> {
    let mut stmt = conn.prepare(
        "SELECT lecturer_id, role FROM committee_roles WHERE thesis_id = ?1 ORDER BY role",
    )?;
    let rows = stmt
        .query_map(params![thesis_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(lecturer_id, role)| {
            let role = Role::parse(&role).ok_or_else(|| {
                StoreError::InvalidInput(format!("unknown committee role '{}'", role))
            })?;
            Ok(CommitteeSeat { lecturer_id, role })
        })
        .collect()
}

/// The lecturer's role on a thesis, if any.
pub(crate) fn role_on_thesis(
    conn: &Connection,
    thesis_id: i64,
    lecturer_id: i64,
) -> Result<Option<Role>> {
    let raw = conn
        .query_row(
            "SELECT role FROM committee_roles WHERE thesis_id = ?1 AND lecturer_id = ?2 LIMIT 1",
            params![thesis_id, lecturer_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    raw.map(|role| {
        Role::parse(&role)
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown committee role '{}'", role)))
    })
    .transpose()
}

/// Scheduled advising sessions for a lecturer on a date, as one-hour blocks.
pub(crate) fn advising_blocks(
    conn: &Connection,
    lecturer_id: i64,
    date: NaiveDate,
) -> Result<Vec<TimeRange>> {
    let mut stmt = conn.prepare(
        "SELECT start_minutes FROM advising_sessions
         WHERE lecturer_id = ?1 AND date = ?2 AND status = 'scheduled'
         ORDER BY start_minutes",
    )?;
    let rows = stmt
        .query_map(params![lecturer_id, date], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|start| advising_block(clock(start)?))
        .collect()
}

/// Defense schedules a lecturer sits on (any committee seat) on a date.
pub(crate) fn defense_blocks(
    conn: &Connection,
    lecturer_id: i64,
    date: NaiveDate,
) -> Result<Vec<TimeRange>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT es.start_minutes, es.end_minutes
         FROM exam_schedules es
         JOIN exam_sessions s    ON s.id = es.session_id
         JOIN committee_roles cr ON cr.thesis_id = s.thesis_id
         WHERE es.date = ?1 AND cr.lecturer_id = ?2
         ORDER BY es.start_minutes",
    )?;
    let rows = stmt
        .query_map(params![date, lecturer_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(start, end)| stored_range(start, end))
        .collect()
}

pub(crate) fn lecturer_blocks(
    conn: &Connection,
    lecturer_id: i64,
    date: NaiveDate,
) -> Result<Vec<TimeRange>> {
    let mut blocks = advising_blocks(conn, lecturer_id, date)?;
    blocks.extend(defense_blocks(conn, lecturer_id, date)?);
    Ok(blocks)
}

pub(crate) fn room_name(conn: &Connection, room_id: i64) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT name FROM rooms WHERE id = ?1",
            params![room_id],
            |row| row.get(0),
        )
        .optional()?)
}

// ---- writes (callers hold the transaction) --------------------------------

pub(crate) fn insert_schedule(
    conn: &Connection,
    session_id: i64,
    date: NaiveDate,
    time: TimeRange,
    room_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO exam_schedules (session_id, date, start_minutes, end_minutes, room_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            date,
            i64::from(time.start.minutes()),
            i64::from(time.end.minutes()),
            room_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Drop any previously assigned examiner seats for the thesis and fill them
/// again from `examiner_ids`, in list order.
pub(crate) fn replace_examiners(
    conn: &Connection,
    thesis_id: i64,
    examiner_ids: &[i64],
) -> Result<()> {
    conn.execute(
        "DELETE FROM committee_roles
         WHERE thesis_id = ?1
           AND role IN ('examiner1', 'examiner2', 'examiner3', 'examiner4')",
        params![thesis_id],
    )?;

    for (position, lecturer_id) in examiner_ids.iter().enumerate() {
        let role = Role::examiner(position).ok_or_else(|| {
            StoreError::InvalidInput(format!("no examiner seat for position {}", position + 1))
        })?;
        conn.execute(
            "INSERT INTO committee_roles (thesis_id, lecturer_id, role) VALUES (?1, ?2, ?3)",
            params![thesis_id, lecturer_id, role.as_str()],
        )?;
    }
    Ok(())
}

pub(crate) fn insert_history(
    conn: &Connection,
    session_id: i64,
    actor_id: Option<i64>,
    change: &str,
    reason: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO schedule_history (session_id, actor_id, change, reason)
         VALUES (?1, ?2, ?3, ?4)",
        params![session_id, actor_id, change, reason],
    )?;
    Ok(())
}

pub(crate) fn set_session_status(
    conn: &Connection,
    session_id: i64,
    status: SessionStatus,
) -> Result<()> {
    conn.execute(
        "UPDATE exam_sessions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), session_id],
    )?;
    Ok(())
}

pub(crate) fn insert_advising(
    conn: &Connection,
    thesis_id: i64,
    lecturer_id: i64,
    role: Role,
    date: NaiveDate,
    start: ClockTime,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO advising_sessions (thesis_id, lecturer_id, role, date, start_minutes, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'scheduled')",
        params![
            thesis_id,
            lecturer_id,
            role.as_str(),
            date,
            i64::from(start.minutes())
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
