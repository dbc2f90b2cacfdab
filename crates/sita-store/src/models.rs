//! Typed rows for the scheduling tables.

use chrono::NaiveDate;
use serde::Serialize;
use sita_engine::time::{ClockTime, TimeRange};

/// Lifecycle of a defense session: registered on approval, scheduled once a
/// room and panel are bound, graded after the defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Registered,
    Scheduled,
    Graded,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Registered => "registered",
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Graded => "graded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "registered" => Some(SessionStatus::Registered),
            "scheduled" => Some(SessionStatus::Scheduled),
            "graded" => Some(SessionStatus::Graded),
            _ => None,
        }
    }
}

/// A committee seat on a thesis: two supervisors carried from the advising
/// phase, up to four examiners assigned at scheduling time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Supervisor1,
    Supervisor2,
    Examiner1,
    Examiner2,
    Examiner3,
    Examiner4,
}

impl Role {
    /// The examiner seats, in assignment order.
    pub const EXAMINERS: [Role; 4] = [
        Role::Examiner1,
        Role::Examiner2,
        Role::Examiner3,
        Role::Examiner4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Supervisor1 => "supervisor1",
            Role::Supervisor2 => "supervisor2",
            Role::Examiner1 => "examiner1",
            Role::Examiner2 => "examiner2",
            Role::Examiner3 => "examiner3",
            Role::Examiner4 => "examiner4",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "supervisor1" => Some(Role::Supervisor1),
            "supervisor2" => Some(Role::Supervisor2),
            "examiner1" => Some(Role::Examiner1),
            "examiner2" => Some(Role::Examiner2),
            "examiner3" => Some(Role::Examiner3),
            "examiner4" => Some(Role::Examiner4),
            _ => None,
        }
    }

    pub fn is_supervisor(self) -> bool {
        matches!(self, Role::Supervisor1 | Role::Supervisor2)
    }

    /// Examiner seat for a zero-based panel position.
    pub fn examiner(position: usize) -> Option<Self> {
        Self::EXAMINERS.get(position).copied()
    }
}

/// A defense session, created once a registration is fully approved.
#[derive(Debug, Clone, Serialize)]
pub struct ExamSession {
    pub id: i64,
    pub thesis_id: i64,
    pub registration_id: i64,
    pub status: SessionStatus,
}

/// The concrete date/time/room binding of a defense session.
#[derive(Debug, Clone, Serialize)]
pub struct ExamSchedule {
    pub id: i64,
    pub session_id: i64,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub time: TimeRange,
    pub room_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisingStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AdvisingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvisingStatus::Scheduled => "scheduled",
            AdvisingStatus::Cancelled => "cancelled",
            AdvisingStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "scheduled" => Some(AdvisingStatus::Scheduled),
            "cancelled" => Some(AdvisingStatus::Cancelled),
            "completed" => Some(AdvisingStatus::Completed),
            _ => None,
        }
    }
}

/// A supervisor's advising appointment with a thesis, stored as a bare start
/// time and treated as a one-hour block.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisingSession {
    pub id: i64,
    pub thesis_id: i64,
    pub lecturer_id: i64,
    pub role: Role,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub status: AdvisingStatus,
}

/// A committee seat as read back from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitteeSeat {
    pub lecturer_id: i64,
    pub role: Role,
}

/// One audit-trail entry for a defense session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub session_id: i64,
    pub actor_id: Option<i64>,
    /// JSON payload describing the change.
    pub change: String,
    pub reason: String,
}
