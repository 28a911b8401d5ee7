//! IANA timezone validation and instant/wall-clock conversion.
//!
//! [`TimeZoneRegistry`] owns the only state in the engine that outlives a call:
//! a cache of identifiers that resolved successfully. It is append-only and
//! never invalidated. Failed lookups are not cached, so garbage input cannot
//! grow it.
//!
//! DST handling is delegated to the tz database shipped with `chrono-tz`; no
//! offset arithmetic happens here.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use serde::Serialize;

use crate::dst::{self, DstPolicy};
use crate::error::{Result, SchedulingError};

/// Validates timezone identifiers and converts between instants and local
/// wall-clock times.
///
/// Safe to share across threads. Concurrent callers may race to insert the
/// same identifier; both writes store the same zone.
#[derive(Debug, Default)]
pub struct TimeZoneRegistry {
    resolved: DashMap<String, Tz>,
}

impl TimeZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` names a zone in the tz database.
    pub fn is_valid_time_zone(&self, id: &str) -> bool {
        self.resolve(id).is_ok()
    }

    /// Resolve `id` to a zone, caching it on success.
    pub fn resolve(&self, id: &str) -> Result<Tz> {
        if let Some(tz) = self.resolved.get(id) {
            return Ok(*tz);
        }
        let tz: Tz = id
            .parse()
            .map_err(|_| SchedulingError::InvalidTimeZone(id.to_string()))?;
        self.resolved.insert(id.to_string(), tz);
        tracing::debug!(timezone = id, "cached timezone");
        Ok(tz)
    }

    /// Number of identifiers currently cached.
    pub fn cached_count(&self) -> usize {
        self.resolved.len()
    }

    /// Present `instant` in `target_tz`.
    ///
    /// Both identifiers must resolve. The instant itself does not change; only
    /// its wall-clock rendering does.
    pub fn convert(
        &self,
        instant: DateTime<Utc>,
        source_tz: &str,
        target_tz: &str,
    ) -> Result<DateTime<Tz>> {
        self.resolve(source_tz)?;
        let target = self.resolve(target_tz)?;
        Ok(instant.with_timezone(&target))
    }

    /// Anchor a wall-clock value in `source_tz`, then present it in `target_tz`.
    ///
    /// Fails with `AmbiguousLocalTime` if the wall-clock value is repeated or
    /// skipped in the source zone.
    pub fn convert_wall_clock(
        &self,
        local: NaiveDateTime,
        source_tz: &str,
        target_tz: &str,
    ) -> Result<DateTime<Tz>> {
        let source = self.resolve(source_tz)?;
        let target = self.resolve(target_tz)?;
        let anchored = dst::resolve_local(&source, local, DstPolicy::Reject)?;
        Ok(anchored.with_timezone(&target))
    }

    /// Wall-clock representation of `instant` in `tz`.
    pub fn localize(&self, instant: DateTime<Utc>, tz: &str) -> Result<DateTime<Tz>> {
        let zone = self.resolve(tz)?;
        Ok(instant.with_timezone(&zone))
    }

    /// Compose a local date and time-of-day in `tz` into an instant.
    ///
    /// Repeated ("fall back") and skipped ("spring forward") wall-clock times
    /// fail with `AmbiguousLocalTime` instead of picking a side.
    pub fn combine(&self, date: NaiveDate, time: NaiveTime, tz: &str) -> Result<DateTime<Utc>> {
        self.combine_with_policy(date, time, tz, DstPolicy::Reject)
    }

    /// Like [`combine`](Self::combine) but with an explicit DST policy.
    pub fn combine_with_policy(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        tz: &str,
        policy: DstPolicy,
    ) -> Result<DateTime<Utc>> {
        let zone = self.resolve(tz)?;
        dst::resolve_local(&zone, date.and_time(time), policy).map(|dt| dt.with_timezone(&Utc))
    }
}

// ── String boundary ─────────────────────────────────────────────────────────

/// An ISO-8601 input as received at the string boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    /// Carried an offset (`Z`, `+02:00`): already an absolute instant.
    Instant(DateTime<Utc>),
    /// No offset: a wall-clock value to be anchored in some zone.
    WallClock(NaiveDateTime),
}

/// Parse an RFC 3339 instant, or a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` value.
pub fn parse_time_input(s: &str) -> Result<TimeInput> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(TimeInput::Instant(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = s.parse::<NaiveDateTime>() {
        return Ok(TimeInput::WallClock(naive));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map(TimeInput::WallClock)
        .map_err(|_| SchedulingError::InvalidDatetime(format!("'{s}' is not ISO-8601")))
}

/// Parse an RFC 3339 string into an instant. Naive values are rejected.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    match parse_time_input(s)? {
        TimeInput::Instant(dt) => Ok(dt),
        TimeInput::WallClock(_) => Err(SchedulingError::InvalidDatetime(format!(
            "'{s}' has no UTC offset"
        ))),
    }
}

/// The result of converting a datetime to a target timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedDatetime {
    /// The instant in UTC (RFC 3339).
    pub utc: String,
    /// The instant in the target timezone (RFC 3339 with offset).
    pub local: String,
    /// The IANA timezone name used.
    pub timezone: String,
    /// The UTC offset at this instant (e.g., "-05:00").
    pub utc_offset: String,
    /// Whether Daylight Saving Time is active at this instant.
    pub dst_active: bool,
}

impl ConvertedDatetime {
    pub fn new(local: &DateTime<Tz>) -> Self {
        Self {
            utc: local.with_timezone(&Utc).to_rfc3339(),
            local: local.to_rfc3339(),
            timezone: local.timezone().name().to_string(),
            utc_offset: format_utc_offset(local),
            dst_active: is_dst_active(local),
        }
    }
}

/// Compare the offset against mid-January and mid-July of the same year; the
/// smaller of the two is standard time.
fn is_dst_active(local: &DateTime<Tz>) -> bool {
    let tz = local.timezone();
    let year = local.with_timezone(&Utc).year();
    let offset_at = |month: u32| {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0)
            .single()
            .map(|dt| dt.with_timezone(&tz).offset().fix().local_minus_utc())
    };
    let current = local.offset().fix().local_minus_utc();
    match (offset_at(1), offset_at(7)) {
        (Some(jan), Some(jul)) if jan != jul => current > jan.min(jul),
        _ => false,
    }
}

/// Format the UTC offset as a string (e.g., "-05:00", "+09:00").
fn format_utc_offset(local: &DateTime<Tz>) -> String {
    let offset_secs = local.offset().fix().local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}
