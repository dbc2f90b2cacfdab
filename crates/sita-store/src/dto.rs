//! Wire-facing request types, keeping the field names the admin frontend
//! already sends.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sita_engine::time::{ClockTime, TimeRange};

use crate::error::{Result, StoreError};

/// A proposed binding of a defense session to a date, time range, room, and
/// examining panel. The session is referenced through its registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(rename = "pendaftaranSidangId")]
    pub registration_id: i64,
    #[serde(rename = "tanggal")]
    pub date: NaiveDate,
    #[serde(rename = "waktu_mulai")]
    pub start: ClockTime,
    #[serde(rename = "waktu_selesai")]
    pub end: ClockTime,
    #[serde(rename = "ruangan_id")]
    pub room_id: i64,
    #[serde(rename = "pengujiIds")]
    pub examiner_ids: Vec<i64>,
}

impl ScheduleRequest {
    /// Reject malformed panels before any query is issued: the department
    /// requires between two and four distinct examiners.
    pub fn validate(&self) -> Result<()> {
        let distinct: BTreeSet<i64> = self.examiner_ids.iter().copied().collect();
        if distinct.len() != self.examiner_ids.len() {
            return Err(StoreError::InvalidInput(
                "examiner ids must be distinct".to_string(),
            ));
        }
        if self.examiner_ids.len() < 2 || self.examiner_ids.len() > 4 {
            return Err(StoreError::InvalidInput(format!(
                "an examining panel needs 2 to 4 lecturers, got {}",
                self.examiner_ids.len()
            )));
        }
        Ok(())
    }

    /// The proposed `[start, end)` interval; rejects empty or inverted input.
    pub fn time_range(&self) -> Result<TimeRange> {
        Ok(TimeRange::new(self.start, self.end)?)
    }
}
