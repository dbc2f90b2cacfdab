//! Clock times and same-day intervals for schedule comparisons.
//!
//! Wall-clock times arrive as `HH:MM` strings and are normalized to integer
//! minutes from midnight on entry, so every comparison downstream is plain
//! integer arithmetic rather than string ordering. Intervals are half-open
//! `[start, end)` -- two bookings that merely touch do not overlap.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

/// Number of minutes in a day; all [`ClockTime`] values are below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute precision, stored as minutes from midnight.
///
/// Ordering and equality follow the underlying minute offset, so `08:00`
/// compares less than `10:30` regardless of how either was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(pub(crate) u16);

impl ClockTime {
    /// Build a clock time from a minutes-from-midnight offset.
    ///
    /// # Errors
    /// Returns `EngineError::TimeOutOfRange` if `minutes` is 24:00 or later.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(EngineError::TimeOutOfRange(u32::from(minutes)));
        }
        Ok(Self(minutes))
    }

    /// Build a clock time from an hour and minute pair.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(EngineError::TimeOutOfRange(
                u32::from(hour) * 60 + u32::from(minute),
            ));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Minutes from midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = EngineError;

    /// Parse an `HH:MM` string in 24-hour form.
    ///
    /// Accepts an unpadded hour (`8:30`); rejects anything without exactly one
    /// `:` separating two in-range numeric components.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidTime(s.to_string());

        let (hour_part, minute_part) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u16 = hour_part.parse().map_err(|_| invalid())?;
        let minute: u16 = minute_part.parse().map_err(|_| invalid())?;
        if hour >= 24 || minute >= 60 {
            return Err(invalid());
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A half-open `[start, end)` interval within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeRange {
    /// Build a range, rejecting empty and inverted intervals.
    ///
    /// # Errors
    /// Returns `EngineError::EmptyRange` unless `start < end`.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self> {
        if start >= end {
            return Err(EngineError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range covering `minutes` starting at `start`.
    ///
    /// # Errors
    /// Returns `EngineError::TimeOutOfRange` if the block would run past the
    /// end of the day, `EngineError::EmptyRange` for a zero-length block.
    pub fn with_duration(start: ClockTime, minutes: u16) -> Result<Self> {
        let end = u32::from(start.0) + u32::from(minutes);
        if end >= u32::from(MINUTES_PER_DAY) {
            return Err(EngineError::TimeOutOfRange(end));
        }
        Self::new(start, ClockTime(end as u16))
    }

    /// Classic half-open overlap test: `a.start < b.end && b.start < a.end`.
    ///
    /// Adjacent ranges (one ends exactly where the other starts) do not
    /// overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.0 - self.start.0
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
