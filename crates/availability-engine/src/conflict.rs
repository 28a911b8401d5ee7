//! Detect busy intervals that collide with a proposed booking.
//!
//! Used at accept time to re-validate that no conflicting commitment was
//! created since the slot was offered. Adjacent intervals (one ends exactly
//! when the other starts) are NOT conflicts.

use serde::Serialize;

use crate::error::Result;
use crate::interval::{self, BusyInterval, TimeInterval};

/// A busy interval that overlaps the candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub source_id: String,
    /// The busy interval after buffer expansion.
    pub busy: TimeInterval,
    pub overlap_minutes: i64,
}

/// Find every busy interval that `candidate` overlaps once each busy interval
/// is widened by `buffer_minutes` on both sides.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
/// Conflicts are returned in input order.
pub fn find_conflicts(
    candidate: &TimeInterval,
    busy: &[BusyInterval],
    buffer_minutes: i64,
) -> Result<Vec<Conflict>> {
    let mut conflicts = Vec::new();

    for entry in busy {
        let expanded = interval::expand(&entry.interval, buffer_minutes)?;
        if let Some(overlap) = candidate.intersection(&expanded) {
            conflicts.push(Conflict {
                source_id: entry.source_id.clone(),
                busy: expanded,
                overlap_minutes: overlap.duration_minutes(),
            });
        }
    }

    Ok(conflicts)
}
