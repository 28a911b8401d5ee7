//! Compute free windows from busy intervals.
//!
//! Expands each busy interval by the buffer, clips it to the window, merges
//! overlapping or adjacent periods, then returns the gaps between them.

use crate::error::Result;
use crate::interval::{self, BusyInterval, TimeInterval};

/// Merge buffer-expanded busy intervals, clipped to `window`.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy(
    busy: &[BusyInterval],
    window: &TimeInterval,
    buffer_minutes: i64,
) -> Result<Vec<TimeInterval>> {
    // Collect intervals clipped to the window, discarding those entirely outside.
    let mut clipped = Vec::with_capacity(busy.len());
    for entry in busy {
        let expanded = interval::expand(&entry.interval, buffer_minutes)?;
        if let Some(inside) = expanded.intersection(window) {
            clipped.push(inside);
        }
    }

    // Sort by start time (then by end time for stability).
    clipped.sort_by_key(|i| (i.start(), i.end()));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(clipped.len());
    for next in clipped {
        if let Some(last) = merged.last_mut() {
            if next.start() <= last.end() {
                // Overlapping or adjacent: extend the current interval.
                if next.end() > last.end() {
                    *last = TimeInterval::new(last.start(), next.end())?;
                }
                continue;
            }
        }
        merged.push(next);
    }

    Ok(merged)
}

/// Free gaps inside `window` once busy intervals (plus buffer) are removed.
///
/// Gaps are returned sorted by start time, regardless of their length.
pub fn free_windows(
    busy: &[BusyInterval],
    window: &TimeInterval,
    buffer_minutes: i64,
) -> Result<Vec<TimeInterval>> {
    let merged = merge_busy(busy, window, buffer_minutes)?;

    let mut free = Vec::with_capacity(merged.len() + 1);
    let mut cursor = window.start();

    for block in &merged {
        if cursor < block.start() {
            free.push(TimeInterval::new(cursor, block.start())?);
        }
        cursor = cursor.max(block.end());
    }

    // Trailing gap after the last busy block.
    if cursor < window.end() {
        free.push(TimeInterval::new(cursor, window.end())?);
    }

    Ok(free)
}
