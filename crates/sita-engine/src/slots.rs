//! Open-slot suggestion for advising appointments.
//!
//! Merges a lecturer's busy intervals for a day, then packs fixed-length
//! slots into the remaining gaps of the working window. Busy intervals are
//! clipped to the window before merging; anything entirely outside it is
//! ignored.

use serde::{Deserialize, Serialize};

use crate::time::{ClockTime, TimeRange};

/// The working-day window slots are packed into.
///
/// Deserializable from config, with the departmental default of hourly slots
/// between 08:00 and 16:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    #[serde(default = "default_opens")]
    pub opens: ClockTime,
    #[serde(default = "default_closes")]
    pub closes: ClockTime,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u16,
}

fn default_opens() -> ClockTime {
    ClockTime(8 * 60)
}

fn default_closes() -> ClockTime {
    ClockTime(16 * 60)
}

fn default_slot_minutes() -> u16 {
    60
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            opens: default_opens(),
            closes: default_closes(),
            slot_minutes: default_slot_minutes(),
        }
    }
}

/// Merge overlapping or touching intervals into a sorted disjoint list.
pub fn merge_busy(mut busy: Vec<TimeRange>) -> Vec<TimeRange> {
    busy.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<TimeRange> = Vec::new();
    for range in busy {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end {
                // Overlapping or adjacent -- extend the current interval.
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Suggest the start times of free slots of `window.slot_minutes` within the
/// working window, given the lecturer's busy intervals for the day.
///
/// The cursor walks the window front to back: slots are emitted while a full
/// slot fits before the next busy interval, then the cursor resumes at that
/// interval's end. After a busy block that ends off the slot grid, subsequent
/// suggestions stay offset rather than snapping back to the grid; advising
/// sessions are stored as bare start times and assumed to occupy one hour.
///
/// Returns start times in ascending order. A lecturer with no commitments
/// gets the full slot list for the window.
pub fn suggest_slots(window: &SlotWindow, busy: &[TimeRange]) -> Vec<ClockTime> {
    let slot = window.slot_minutes;
    if slot == 0 || window.opens >= window.closes {
        return Vec::new();
    }

    // Clip to the window, discarding intervals entirely outside it.
    let clipped: Vec<TimeRange> = busy
        .iter()
        .filter(|range| range.start < window.closes && range.end > window.opens)
        .map(|range| TimeRange {
            start: range.start.max(window.opens),
            end: range.end.min(window.closes),
        })
        .collect();
    let merged = merge_busy(clipped);

    let mut slots = Vec::new();
    let mut cursor = window.opens.minutes();

    for range in &merged {
        while cursor + slot <= range.start.minutes() {
            slots.push(ClockTime(cursor));
            cursor += slot;
        }
        cursor = cursor.max(range.end.minutes());
    }

    // Trailing slots after the last busy interval.
    while cursor + slot <= window.closes.minutes() {
        slots.push(ClockTime(cursor));
        cursor += slot;
    }

    slots
}
