//! Tests for the room-exclusivity and committee-availability rules.

use sita_engine::conflict::{
    committee_conflicts, evaluate, room_conflict, CommitteeMember, PanelBooking, RoomBooking,
};
use sita_engine::time::TimeRange;

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::new(
        start.parse().expect("start must parse"),
        end.parse().expect("end must parse"),
    )
    .expect("test ranges must be non-empty")
}

fn booking(room: &str, student: &str, start: &str, end: &str) -> RoomBooking {
    RoomBooking {
        session_id: 99,
        room_name: room.to_string(),
        student_name: student.to_string(),
        range: range(start, end),
    }
}

fn panel(thesis_id: i64, start: &str, end: &str, members: &[(i64, &str)]) -> PanelBooking {
    PanelBooking {
        session_id: thesis_id + 100,
        thesis_id,
        range: range(start, end),
        committee: members
            .iter()
            .map(|(id, name)| CommitteeMember {
                lecturer_id: *id,
                name: (*name).to_string(),
            })
            .collect(),
    }
}

#[test]
fn overlapping_room_booking_names_room_and_student() {
    // Room 101 is taken 09:30-10:30; proposing 09:00-10:00 must clash.
    let bookings = vec![booking("Room 101", "Student B", "09:30", "10:30")];

    let message = room_conflict(range("09:00", "10:00"), &bookings)
        .expect("overlapping booking must be reported");

    assert!(message.contains("Room 101"), "message: {}", message);
    assert!(message.contains("Student B"), "message: {}", message);
    assert!(
        message.contains("09:30 - 10:30"),
        "message should carry the occupied interval: {}",
        message
    );
}

#[test]
fn non_overlapping_room_booking_is_clear() {
    let bookings = vec![booking("Room 101", "Student B", "13:00", "14:00")];
    assert_eq!(room_conflict(range("09:00", "10:00"), &bookings), None);
}

#[test]
fn adjacent_room_booking_is_clear() {
    let bookings = vec![booking("Room 101", "Student B", "10:00", "11:00")];
    assert_eq!(
        room_conflict(range("09:00", "10:00"), &bookings),
        None,
        "a defense ending exactly when the next starts is not a clash"
    );
}

#[test]
fn only_first_room_clash_is_reported() {
    let bookings = vec![
        booking("Room 101", "Student B", "09:15", "09:45"),
        booking("Room 101", "Student C", "09:30", "10:30"),
    ];

    let message = room_conflict(range("09:00", "10:00"), &bookings).unwrap();
    assert!(message.contains("Student B"));
    assert!(!message.contains("Student C"));
}

#[test]
fn committee_member_on_overlapping_defense_is_reported() {
    // Prof A (id 1) examines thesis 7 at 10:00-11:00; proposing a defense
    // with Prof A at 10:30-11:30 must clash.
    let others = vec![panel(7, "10:00", "11:00", &[(1, "Prof A"), (2, "Prof B")])];

    let messages = committee_conflicts(range("10:30", "11:30"), &[1, 3], &others);

    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Prof A"), "message: {}", messages[0]);
    assert!(
        !messages[0].contains("Prof B"),
        "uninvolved lecturers must not be named: {}",
        messages[0]
    );
    assert!(messages[0].contains("thesis #7"), "message: {}", messages[0]);
}

#[test]
fn committee_overlap_without_shared_members_is_clear() {
    let others = vec![panel(7, "10:00", "11:00", &[(5, "Prof E")])];
    let messages = committee_conflicts(range("10:00", "11:00"), &[1, 2], &others);
    assert!(messages.is_empty());
}

#[test]
fn committee_shared_member_without_overlap_is_clear() {
    let others = vec![panel(7, "08:00", "09:00", &[(1, "Prof A")])];
    let messages = committee_conflicts(range("10:00", "11:00"), &[1], &others);
    assert!(messages.is_empty());
}

#[test]
fn one_message_per_clashing_schedule() {
    let others = vec![
        panel(7, "10:00", "11:00", &[(1, "Prof A")]),
        panel(8, "10:30", "11:30", &[(2, "Prof B")]),
    ];

    let messages = committee_conflicts(range("10:00", "12:00"), &[1, 2], &others);
    assert_eq!(messages.len(), 2, "each clashing schedule gets its own message");
}

#[test]
fn evaluate_accumulates_both_rules() {
    let rooms = vec![booking("Room 101", "Student B", "09:30", "10:30")];
    let others = vec![panel(7, "09:00", "10:00", &[(1, "Prof A")])];

    let report = evaluate(range("09:00", "10:00"), &rooms, &[1], &others);

    assert!(report.has_conflict);
    assert_eq!(report.messages.len(), 2);
    assert!(report.messages[0].contains("Room 101"));
    assert!(report.messages[1].contains("Prof A"));
}

#[test]
fn evaluate_clear_when_nothing_collides() {
    let report = evaluate(range("09:00", "10:00"), &[], &[1, 2], &[]);
    assert!(!report.has_conflict);
    assert!(report.messages.is_empty());
}

#[test]
fn report_serializes_with_wire_field_names() {
    let report = evaluate(range("09:00", "10:00"), &[], &[], &[]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["hasConflict"], serde_json::json!(false));
    assert!(json["messages"].as_array().unwrap().is_empty());
}
