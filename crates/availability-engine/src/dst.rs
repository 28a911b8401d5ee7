//! DST transition policies for composing local wall-clock times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Upper bound on how far [`DstPolicy::ShiftForward`] walks out of a gap.
/// Covers every transition in the tz database, including whole skipped days.
const MAX_SHIFT_MINUTES: i64 = 48 * 60;

/// Policy for wall-clock times that fall on a DST transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Fail with `AmbiguousLocalTime` for repeated and skipped times.
    #[default]
    Reject,
    /// Repeated times resolve to the first occurrence; skipped times fail.
    Earliest,
    /// Repeated times resolve to the second occurrence; skipped times fail.
    Latest,
    /// Repeated times resolve to the first occurrence; skipped times move to
    /// the first valid wall-clock minute after the gap.
    ShiftForward,
}

/// Anchor a naive wall-clock value in `tz` according to `policy`.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, latest) => match policy {
            DstPolicy::Reject => Err(SchedulingError::AmbiguousLocalTime(format!(
                "{local} occurs twice in {tz} (fall-back transition)"
            ))),
            DstPolicy::Earliest | DstPolicy::ShiftForward => Ok(earliest),
            DstPolicy::Latest => Ok(latest),
        },
        LocalResult::None => match policy {
            DstPolicy::ShiftForward => shift_past_gap(tz, local),
            _ => Err(SchedulingError::AmbiguousLocalTime(format!(
                "{local} does not exist in {tz} (spring-forward transition)"
            ))),
        },
    }
}

fn shift_past_gap(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Tz>> {
    for minutes in 1..=MAX_SHIFT_MINUTES {
        let candidate = local + Duration::minutes(minutes);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Ok(dt);
        }
    }
    Err(SchedulingError::AmbiguousLocalTime(format!(
        "no valid wall-clock time within two days after {local} in {tz}"
    )))
}
