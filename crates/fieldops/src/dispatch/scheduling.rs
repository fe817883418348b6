use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open appointment window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidWindow> {
        if start >= end {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Half-open overlap test: windows that merely touch do not overlap,
    /// so back-to-back bookings are allowed.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("appointment window must start before it ends ({start} >= {end})")]
pub struct InvalidWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A rejected booking, carrying enough detail to explain what blocks it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "schedule conflict: {technician} is already booked for \"{job_title}\" from {} to {}",
    booked.start.format("%Y-%m-%d %H:%M"),
    booked.end.format("%Y-%m-%d %H:%M")
)]
pub struct ScheduleConflict {
    pub technician: String,
    pub job_title: String,
    pub booked: TimeWindow,
}
