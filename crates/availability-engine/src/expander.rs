//! RFC 5545 RRULE expansion for recurring series stored as RRULE strings.
//!
//! Wraps the `rrule` crate (v0.13). Occurrences are computed on whole dates,
//! anchored at midnight UTC, and clipped to an inclusive date range so the
//! output lines up with [`crate::recurrence::expand`].

use chrono::NaiveDate;
use rrule::RRuleSet;

use crate::error::{Result, SchedulingError};

/// Expand an RRULE value (e.g. `"FREQ=WEEKLY;BYDAY=TU,TH"`) into occurrence
/// dates within `[bound_start, bound_end]`.
///
/// `bound_start` is the series DTSTART. If the rule carries no `UNTIL` and no
/// `COUNT`, `bound_end` is injected as `UNTIL`. Expansion past `limit`
/// occurrences fails with `InputOutOfRange` instead of truncating, as does a
/// series longer than the rrule crate's per-call cap of `u16::MAX` dates.
///
/// # Errors
/// Returns `SchedulingError::UnsupportedRecurrenceType` if the RRULE string is
/// empty or unparseable.
pub fn expand_rrule_dates(
    rrule: &str,
    bound_start: NaiveDate,
    bound_end: NaiveDate,
    limit: usize,
) -> Result<Vec<NaiveDate>> {
    let rrule = rrule.trim().trim_start_matches("RRULE:");
    if rrule.is_empty() {
        return Err(SchedulingError::UnsupportedRecurrenceType(
            "empty RRULE string".to_string(),
        ));
    }
    if bound_end < bound_start {
        return Ok(Vec::new());
    }

    let mut rrule_str = rrule.to_string();
    let upper = rrule_str.to_uppercase();
    if !upper.contains("UNTIL=") && !upper.contains("COUNT=") {
        rrule_str = format!("{};UNTIL={}T235959Z", rrule_str, bound_end.format("%Y%m%d"));
    }

    let rrule_text = format!(
        "DTSTART:{}T000000Z\nRRULE:{}",
        bound_start.format("%Y%m%d"),
        rrule_str
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| SchedulingError::UnsupportedRecurrenceType(format!("{e}")))?;

    // Ask for one more than the limit so an overflowing series is detectable.
    let max_count = u16::try_from(limit.saturating_add(1)).unwrap_or(u16::MAX);
    let result = rrule_set.all(max_count);
    // The rrule crate stops at `max_count`; if it stopped inside the bounds,
    // the series was cut short.
    let truncated = result.limited
        && result
            .dates
            .last()
            .is_some_and(|last| last.date_naive() <= bound_end);
    let dates: Vec<NaiveDate> = result
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|d| *d >= bound_start && *d <= bound_end)
        .collect();

    if dates.len() > limit {
        return Err(SchedulingError::InputOutOfRange(format!(
            "RRULE produces more than {limit} occurrences"
        )));
    }
    if truncated {
        return Err(SchedulingError::InputOutOfRange(format!(
            "RRULE produces more than {max_count} occurrences, the most one expansion can return"
        )));
    }
    Ok(dates)
}
