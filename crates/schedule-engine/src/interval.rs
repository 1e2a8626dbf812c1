//! Half-open time intervals and buffer arithmetic.
//!
//! `[start, end)`: two intervals that merely touch (one ends exactly when the
//! other starts) do NOT overlap.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Margin applied before and after every appointment when testing for conflicts.
pub const BUFFER_MINUTES: i64 = 30;

/// A half-open `[start, end)` interval with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    #[serde(rename = "start_time")]
    start: DateTime<Utc>,
    #[serde(rename = "end_time")]
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = SchedulingError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        TimeInterval::new(raw.start_time, raw.end_time)
    }
}

impl TimeInterval {
    /// # Errors
    /// Returns `SchedulingError::InvalidRange` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(SchedulingError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval of `minutes` length starting at `start`.
    ///
    /// # Errors
    /// Returns `SchedulingError::InvalidRange` when `minutes` is not positive or
    /// the end is past the representable range.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self> {
        let end = shift(start, minutes).ok_or(SchedulingError::InvalidRange { start, end: start })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `a.start < b.end && a.end > b.start`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Expand by `minutes` on both sides. Negative margins count as zero, and
    /// the ends saturate at the representable range.
    pub fn with_buffer(&self, minutes: i64) -> TimeInterval {
        let margin = minutes.max(0);
        TimeInterval {
            start: shift(self.start, -margin).unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: shift(self.end, margin).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// True when `instant` lies in the closed range `[start, end]`.
    pub fn contains_inclusive(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// `instant` moved by `minutes`, or `None` if that leaves chrono's range.
pub(crate) fn shift(instant: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(minutes).and_then(|delta| instant.checked_add_signed(delta))
}

/// Free-function form of [`TimeInterval::overlaps`].
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.overlaps(b)
}

/// Free-function form of [`TimeInterval::with_buffer`].
pub fn with_buffer(slot: &TimeInterval, minutes: i64) -> TimeInterval {
    slot.with_buffer(minutes)
}

/// A window proposed for an event: when the interview *could* happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateInterval(TimeInterval);

impl CandidateInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        TimeInterval::new(start, end).map(Self)
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.0
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.0.end
    }
}

impl From<TimeInterval> for CandidateInterval {
    fn from(interval: TimeInterval) -> Self {
        Self(interval)
    }
}

impl fmt::Display for CandidateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The committed meeting time of a confirmed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmedInterval(TimeInterval);

impl ConfirmedInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        TimeInterval::new(start, end).map(Self)
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.0
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.0.end
    }
}

impl From<TimeInterval> for ConfirmedInterval {
    fn from(interval: TimeInterval) -> Self {
        Self(interval)
    }
}

impl fmt::Display for ConfirmedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
