//! Half-open interval algebra.
//!
//! A [`TimeInterval`] covers `[start, end)`: it includes its start and excludes
//! its end, so two intervals that merely touch (`a.end == b.start`) tile without
//! overlapping. The slot finder relies on this to place bookings back-to-back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// An absolute `[start, end)` range with `end > start`.
///
/// The invariant is enforced at construction (including deserialization); an
/// interval with `end <= start` is rejected, never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = SchedulingError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Build an interval, failing with [`SchedulingError::InvalidInterval`]
    /// unless `end > start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(SchedulingError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build an interval of `minutes` length starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self> {
        let end = start
            .checked_add_signed(minutes_delta(minutes)?)
            .ok_or_else(|| {
                SchedulingError::InputOutOfRange(format!(
                    "{minutes} minutes after {start} is not representable"
                ))
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whole minutes covered, rounded down.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The common part of two intervals, if they overlap.
    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !overlaps(self, other) {
            return None;
        }
        Some(TimeInterval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

/// A caller-supplied busy period tagged with an opaque source id
/// (an existing booking, a calendar event, a manual block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBusyInterval", rename_all = "camelCase")]
pub struct BusyInterval {
    pub source_id: String,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBusyInterval {
    #[serde(default)]
    source_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawBusyInterval> for BusyInterval {
    type Error = SchedulingError;

    fn try_from(raw: RawBusyInterval) -> Result<Self> {
        BusyInterval::new(raw.source_id, raw.start, raw.end)
    }
}

impl BusyInterval {
    pub fn new(
        source_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            source_id: source_id.into(),
            interval: TimeInterval::new(start, end)?,
        })
    }
}

/// A bookable slot produced by the slot finder. Output only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl From<TimeInterval> for AvailableSlot {
    fn from(interval: TimeInterval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            duration_minutes: interval.duration_minutes(),
        }
    }
}

impl AvailableSlot {
    pub fn interval(&self) -> Result<TimeInterval> {
        TimeInterval::new(self.start, self.end)
    }
}

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
///
/// Touching intervals (`a.end == b.start`) do not overlap.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Floor of `(end - start)` in minutes, failing with
/// [`SchedulingError::InvalidInterval`] when `end <= start`.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
    TimeInterval::new(start, end).map(|i| i.duration_minutes())
}

/// Widen `interval` by the full `buffer_minutes` on each side.
///
/// Two busy blocks expanded this way and then placed back-to-back leave a net
/// idle gap of `buffer_minutes` around each booking.
pub fn expand(interval: &TimeInterval, buffer_minutes: i64) -> Result<TimeInterval> {
    if buffer_minutes < 0 {
        return Err(SchedulingError::InputOutOfRange(format!(
            "buffer must be non-negative, got {buffer_minutes} minutes"
        )));
    }
    if buffer_minutes == 0 {
        return Ok(*interval);
    }
    let buffer = minutes_delta(buffer_minutes)?;
    let unrepresentable = || {
        SchedulingError::InputOutOfRange(format!(
            "buffer of {buffer_minutes} minutes pushes interval out of range"
        ))
    };
    let start = interval
        .start
        .checked_sub_signed(buffer)
        .ok_or_else(unrepresentable)?;
    let end = interval
        .end
        .checked_add_signed(buffer)
        .ok_or_else(unrepresentable)?;
    Ok(TimeInterval { start, end })
}

/// `minutes` as a [`Duration`], failing with `InputOutOfRange` when chrono
/// cannot represent it.
pub(crate) fn minutes_delta(minutes: i64) -> Result<Duration> {
    Duration::try_minutes(minutes).ok_or_else(|| {
        SchedulingError::InputOutOfRange(format!(
            "{minutes} minutes is not a representable duration"
        ))
    })
}
