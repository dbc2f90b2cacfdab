//! Tests for clock-time parsing, formatting, and interval overlap.

use sita_engine::error::EngineError;
use sita_engine::time::{ClockTime, TimeRange};

fn time(s: &str) -> ClockTime {
    s.parse().expect("test times must parse")
}

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::new(time(start), time(end)).expect("test ranges must be non-empty")
}

#[test]
fn parses_padded_and_unpadded_hours() {
    assert_eq!(time("08:00").minutes(), 480);
    assert_eq!(time("8:30").minutes(), 510);
    assert_eq!(time("00:00").minutes(), 0);
    assert_eq!(time("23:59").minutes(), 1439);
}

#[test]
fn rejects_malformed_times() {
    for bad in ["", "9", "9:00 AM", "24:00", "08:61", "0800", "8:3:0", "ab:cd"] {
        let parsed: Result<ClockTime, _> = bad.parse();
        assert!(
            matches!(parsed, Err(EngineError::InvalidTime(_))),
            "'{}' should be rejected, got {:?}",
            bad,
            parsed
        );
    }
}

#[test]
fn formats_zero_padded() {
    assert_eq!(time("8:05").to_string(), "08:05");
    assert_eq!(time("16:00").to_string(), "16:00");
}

#[test]
fn parse_format_is_stable() {
    // A formatted time parses back to the same offset.
    for minutes in [0u16, 1, 59, 60, 480, 719, 1439] {
        let t = ClockTime::from_minutes(minutes).unwrap();
        assert_eq!(time(&t.to_string()), t);
    }
}

#[test]
fn ordering_follows_minute_offset() {
    assert!(time("08:00") < time("10:30"));
    assert!(time("9:00") < time("10:00"), "unpadded hour must not sort as text");
}

#[test]
fn from_minutes_rejects_out_of_range() {
    assert!(ClockTime::from_minutes(1440).is_err());
    assert!(ClockTime::from_minutes(1439).is_ok());
}

#[test]
fn empty_range_rejected() {
    let at = time("10:00");
    assert!(matches!(
        TimeRange::new(at, at),
        Err(EngineError::EmptyRange { .. })
    ));
    assert!(TimeRange::new(time("11:00"), time("10:00")).is_err());
}

#[test]
fn with_duration_builds_hour_block() {
    let block = TimeRange::with_duration(time("10:00"), 60).unwrap();
    assert_eq!(block, range("10:00", "11:00"));
    assert_eq!(block.duration_minutes(), 60);
}

#[test]
fn with_duration_rejects_past_midnight() {
    assert!(TimeRange::with_duration(time("23:30"), 60).is_err());
}

#[test]
fn overlap_detected_for_partial_and_contained() {
    let a = range("09:00", "10:00");
    assert!(a.overlaps(&range("09:30", "10:30")), "partial overlap");
    assert!(a.overlaps(&range("08:00", "12:00")), "containing interval");
    assert!(range("08:00", "12:00").overlaps(&a), "contained interval");
}

#[test]
fn adjacent_ranges_do_not_overlap() {
    // 10:00-11:00 and 11:00-12:00 are compatible.
    assert!(!range("10:00", "11:00").overlaps(&range("11:00", "12:00")));
    assert!(!range("11:00", "12:00").overlaps(&range("10:00", "11:00")));
}

#[test]
fn disjoint_ranges_do_not_overlap() {
    assert!(!range("08:00", "09:00").overlaps(&range("13:00", "14:00")));
}

#[test]
fn serde_uses_hh_mm_strings() {
    let json = serde_json::to_string(&time("09:05")).unwrap();
    assert_eq!(json, "\"09:05\"");

    let back: ClockTime = serde_json::from_str("\"14:30\"").unwrap();
    assert_eq!(back, time("14:30"));

    let bad: Result<ClockTime, _> = serde_json::from_str("\"25:00\"");
    assert!(bad.is_err(), "out-of-range times must fail deserialization");
}
