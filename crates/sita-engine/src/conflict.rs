//! Room and committee conflict rules for defense scheduling.
//!
//! Pure decision logic over booking records the storage layer has already
//! fetched for the proposed date: the store decides *what* to load, these
//! rules decide *whether* a proposed binding collides and produce the
//! human-readable messages shown to the scheduling admin.

use serde::{Deserialize, Serialize};

use crate::time::TimeRange;

/// An existing booking of the proposed room, with enough context to name the
/// occupant in a conflict message.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomBooking {
    /// The defense session this booking belongs to.
    pub session_id: i64,
    pub room_name: String,
    /// Name of the student whose defense occupies the room.
    pub student_name: String,
    pub range: TimeRange,
}

/// A lecturer sitting on a defense committee.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitteeMember {
    pub lecturer_id: i64,
    pub name: String,
}

/// Another defense schedule on the same date, carried with its full committee
/// so membership intersections can be checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelBooking {
    pub session_id: i64,
    pub thesis_id: i64,
    pub range: TimeRange,
    pub committee: Vec<CommitteeMember>,
}

/// Outcome of a conflict check.
///
/// `messages` accumulates one entry per detected clash; `has_conflict` is
/// simply whether any message was produced. Serialized with the wire field
/// names the admin frontend expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub messages: Vec<String>,
}

impl ConflictReport {
    /// A report with no conflicts.
    pub fn clear() -> Self {
        Self {
            has_conflict: false,
            messages: Vec::new(),
        }
    }

    pub fn from_messages(messages: Vec<String>) -> Self {
        Self {
            has_conflict: !messages.is_empty(),
            messages,
        }
    }
}

/// Check the room-exclusivity rule.
///
/// Returns a message for the first booking of the room whose interval
/// overlaps `proposed`, naming the room and the occupying student. Callers
/// pass only bookings of the proposed room on the proposed date, with the
/// session being (re)scheduled already excluded.
pub fn room_conflict(proposed: TimeRange, bookings: &[RoomBooking]) -> Option<String> {
    bookings
        .iter()
        .find(|booking| booking.range.overlaps(&proposed))
        .map(|booking| {
            format!(
                "{} is already booked for the defense of {} ({}).",
                booking.room_name, booking.student_name, booking.range
            )
        })
}

/// Check the committee-availability rule.
///
/// For every other schedule on the date whose interval overlaps `proposed`
/// and whose committee intersects `committee_ids`, produce one message
/// naming the clashing lecturers and the thesis that already claims them.
pub fn committee_conflicts(
    proposed: TimeRange,
    committee_ids: &[i64],
    others: &[PanelBooking],
) -> Vec<String> {
    let mut messages = Vec::new();

    for other in others {
        if !other.range.overlaps(&proposed) {
            continue;
        }

        let clashing: Vec<&str> = other
            .committee
            .iter()
            .filter(|member| committee_ids.contains(&member.lecturer_id))
            .map(|member| member.name.as_str())
            .collect();

        if !clashing.is_empty() {
            messages.push(format!(
                "These lecturers already sit on another defense at the same time: {} (thesis #{}).",
                clashing.join(", "),
                other.thesis_id
            ));
        }
    }

    messages
}

/// Evaluate both rules for a proposed binding: room exclusivity first, then
/// committee availability. Messages from both rules are accumulated, not
/// deduplicated.
pub fn evaluate(
    proposed: TimeRange,
    room_bookings: &[RoomBooking],
    committee_ids: &[i64],
    other_schedules: &[PanelBooking],
) -> ConflictReport {
    let mut messages = Vec::new();

    if let Some(message) = room_conflict(proposed, room_bookings) {
        messages.push(message);
    }
    messages.extend(committee_conflicts(proposed, committee_ids, other_schedules));

    ConflictReport::from_messages(messages)
}
