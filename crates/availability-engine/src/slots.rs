//! Enumerate bookable slots of a fixed length inside a window.
//!
//! Candidates are placed back-to-back from the window start. Each is rejected
//! if it overlaps a buffer-expanded busy interval, or if either its start or
//! the instant just before its end falls outside business hours. A slot is
//! never split by a business-hours boundary.
//!
//! Guarantees on the output:
//! - slots are pairwise non-overlapping and sorted by start
//! - no slot overlaps any buffer-expanded busy interval
//! - no slot ends after the window end
//! - every slot is exactly the requested length

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::business_hours::{self, BusinessHoursSpec};
use crate::error::{Result, SchedulingError};
use crate::interval::{self, AvailableSlot, BusyInterval, TimeInterval};

/// How far [`next_available_slot`] looks ahead by default.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Parameters for [`find_available_slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotQuery {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Idle time enforced on each side of every busy interval. `None` means 0.
    pub buffer_minutes: Option<i64>,
}

impl SlotQuery {
    pub fn new(
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            window_start,
            window_end,
            duration_minutes,
            buffer_minutes: None,
        }
    }

    pub fn with_buffer(mut self, buffer_minutes: i64) -> Self {
        self.buffer_minutes = Some(buffer_minutes);
        self
    }
}

/// Find back-to-back slots of `query.duration_minutes` inside the window.
///
/// # Errors
/// `InvalidInterval` if the window is empty or inverted; `InputOutOfRange` if
/// the duration is not positive or the buffer is negative.
pub fn find_available_slots(
    query: &SlotQuery,
    busy: &[BusyInterval],
    hours: &BusinessHoursSpec,
    tz: &Tz,
) -> Result<Vec<AvailableSlot>> {
    let window = TimeInterval::new(query.window_start, query.window_end)?;
    if query.duration_minutes <= 0 {
        return Err(SchedulingError::InputOutOfRange(format!(
            "slot duration must be positive, got {} minutes",
            query.duration_minutes
        )));
    }
    let duration = interval::minutes_delta(query.duration_minutes)?;
    let buffer_minutes = query.buffer_minutes.unwrap_or(0);
    if buffer_minutes < 0 {
        return Err(SchedulingError::InputOutOfRange(format!(
            "buffer must be non-negative, got {buffer_minutes} minutes"
        )));
    }

    // No merging needed: every candidate is checked against all of them.
    let mut blocked = busy
        .iter()
        .map(|b| interval::expand(&b.interval, buffer_minutes))
        .collect::<Result<Vec<_>>>()?;
    blocked.sort_by_key(|b| (b.start(), b.end()));

    let mut slots = Vec::new();
    let mut rejected = 0usize;
    let mut cursor = window.start();

    while cursor < window.end() {
        let Some(end) = cursor.checked_add_signed(duration) else {
            break;
        };
        if end > window.end() {
            break;
        }
        let candidate = TimeInterval::new(cursor, end)?;

        if let Some(blocked_until) = latest_blocker_end(&candidate, &blocked) {
            tracing::trace!(start = %cursor, %blocked_until, "candidate overlaps busy interval");
            rejected += 1;
            match step(cursor) {
                Some(next) => cursor = next.max(blocked_until),
                None => break,
            }
            continue;
        }

        if !within_business_hours(&candidate, hours, tz) {
            tracing::trace!(start = %cursor, "candidate outside business hours");
            rejected += 1;
            match step(cursor) {
                Some(next) => cursor = next,
                None => break,
            }
            continue;
        }

        slots.push(AvailableSlot::from(candidate));
        cursor = end;
    }

    tracing::debug!(
        window_start = %window.start(),
        window_end = %window.end(),
        duration_minutes = query.duration_minutes,
        buffer_minutes,
        busy = busy.len(),
        found = slots.len(),
        rejected,
        "slot search finished"
    );
    Ok(slots)
}

/// The first slot of `duration_minutes` at or after `from`, scanning one
/// day-sized window at a time for up to `horizon_days` days.
///
/// Returns `Ok(None)` when the horizon is exhausted without a fit. Slots never
/// straddle the boundary between two day windows, so a duration longer than a
/// day never fits.
pub fn next_available_slot(
    from: DateTime<Utc>,
    duration_minutes: i64,
    busy: &[BusyInterval],
    hours: &BusinessHoursSpec,
    tz: &Tz,
    buffer_minutes: i64,
    horizon_days: u32,
) -> Result<Option<AvailableSlot>> {
    for day in 0..i64::from(horizon_days) {
        let Some(window_start) = from.checked_add_signed(Duration::days(day)) else {
            break;
        };
        let Some(window_end) = window_start.checked_add_signed(Duration::days(1)) else {
            break;
        };
        let query = SlotQuery::new(window_start, window_end, duration_minutes)
            .with_buffer(buffer_minutes);
        if let Some(slot) = find_available_slots(&query, busy, hours, tz)?
            .into_iter()
            .next()
        {
            return Ok(Some(slot));
        }
    }
    tracing::debug!(%from, duration_minutes, horizon_days, "no slot within horizon");
    Ok(None)
}

/// Latest end among blocked intervals that overlap `candidate`.
///
/// Skipping the cursor to that instant is safe: any candidate starting earlier
/// would still overlap the same interval.
fn latest_blocker_end(
    candidate: &TimeInterval,
    blocked: &[TimeInterval],
) -> Option<DateTime<Utc>> {
    blocked
        .iter()
        .take_while(|b| b.start() < candidate.end())
        .filter(|b| interval::overlaps(candidate, b))
        .map(|b| b.end())
        .max()
}

fn within_business_hours(candidate: &TimeInterval, hours: &BusinessHoursSpec, tz: &Tz) -> bool {
    let last_instant = candidate.end() - Duration::nanoseconds(1);
    business_hours::is_open(candidate.start(), hours, tz)
        && business_hours::is_open(last_instant, hours, tz)
}

fn step(cursor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    cursor.checked_add_signed(Duration::minutes(1))
}
