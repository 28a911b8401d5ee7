//! Weekly open-hours policy evaluated in a provider's local timezone.
//!
//! Weekdays are numbered 0 (Sunday) through 6 (Saturday). Open hours are
//! half-open like every other interval in the engine: `open` is inside,
//! `close` is not.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Hours for a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayHours {
    /// Open from `open` until `close`; `close == None` means until midnight.
    Open {
        open: NaiveTime,
        close: Option<NaiveTime>,
    },
    Closed,
}

impl DayHours {
    /// Open over `[open, close)`. Fails with `InputOutOfRange` unless
    /// `open < close`; overnight ranges are not supported.
    pub fn open(open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open >= close {
            return Err(SchedulingError::InputOutOfRange(format!(
                "opening time {open} must be before closing time {close}"
            )));
        }
        Ok(DayHours::Open {
            open,
            close: Some(close),
        })
    }

    pub fn open_until_midnight(open: NaiveTime) -> Self {
        DayHours::Open { open, close: None }
    }

    pub fn all_day() -> Self {
        DayHours::Open {
            open: NaiveTime::default(),
            close: None,
        }
    }

    /// Whether the local time-of-day `t` falls inside these hours.
    pub fn contains(&self, t: NaiveTime) -> bool {
        match self {
            DayHours::Closed => false,
            DayHours::Open { open, close } => t >= *open && close.is_none_or(|c| t < c),
        }
    }
}

/// Open hours per weekday, with an optional fallback for unlisted weekdays.
///
/// A weekday that is neither listed nor covered by a default is closed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, RawDayHours>",
    into = "BTreeMap<String, RawDayHours>"
)]
pub struct BusinessHoursSpec {
    days: BTreeMap<u8, DayHours>,
    default: Option<DayHours>,
}

impl BusinessHoursSpec {
    /// An empty spec: closed every day until entries are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open around the clock, every day.
    pub fn always_open() -> Self {
        Self::new().with_default(DayHours::all_day())
    }

    /// Monday to Friday, 09:00 to 17:00; weekends closed.
    pub fn standard_weekdays() -> Self {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default();
        let mut spec = Self::new();
        for weekday in 1..=5 {
            spec.days.insert(
                weekday,
                DayHours::Open {
                    open: nine,
                    close: Some(five),
                },
            );
        }
        spec.with_default(DayHours::Closed)
    }

    /// Set the hours for `weekday` (0 = Sunday .. 6 = Saturday).
    pub fn set(&mut self, weekday: u8, hours: DayHours) -> Result<()> {
        check_weekday(weekday)?;
        self.days.insert(weekday, hours);
        Ok(())
    }

    pub fn with_day(mut self, weekday: u8, hours: DayHours) -> Result<Self> {
        self.set(weekday, hours)?;
        Ok(self)
    }

    pub fn with_default(mut self, hours: DayHours) -> Self {
        self.default = Some(hours);
        self
    }

    /// The entry governing `weekday`, falling back to the default.
    pub fn hours_for(&self, weekday: u8) -> DayHours {
        self.days
            .get(&weekday)
            .copied()
            .or(self.default)
            .unwrap_or(DayHours::Closed)
    }

    /// Whether a local wall-clock value is inside open hours.
    pub fn is_open_local(&self, local: &NaiveDateTime) -> bool {
        let weekday = local.weekday().num_days_from_sunday() as u8;
        self.hours_for(weekday).contains(local.time())
    }
}

/// Whether `instant`, seen from `tz`, falls inside `spec`'s open hours.
pub fn is_open(instant: DateTime<Utc>, spec: &BusinessHoursSpec, tz: &Tz) -> bool {
    spec.is_open_local(&instant.with_timezone(tz).naive_local())
}

fn check_weekday(weekday: u8) -> Result<()> {
    if weekday > 6 {
        return Err(SchedulingError::InputOutOfRange(format!(
            "weekday must be 0-6, got {weekday}"
        )));
    }
    Ok(())
}

// ── JSON shape ──────────────────────────────────────────────────────────────

/// `{"open": "09:00", "close": "17:00"}` or `{"closed": true}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDayHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    open: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    close: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    closed: bool,
}

const DEFAULT_KEY: &str = "default";

impl TryFrom<BTreeMap<String, RawDayHours>> for BusinessHoursSpec {
    type Error = SchedulingError;

    fn try_from(raw: BTreeMap<String, RawDayHours>) -> Result<Self> {
        let mut spec = BusinessHoursSpec::new();
        for (key, entry) in raw {
            let hours = DayHours::try_from(entry)?;
            if key == DEFAULT_KEY {
                spec.default = Some(hours);
                continue;
            }
            let weekday: u8 = key.parse().map_err(|_| {
                SchedulingError::InputOutOfRange(format!(
                    "business hours key must be 0-6 or \"default\", got \"{key}\""
                ))
            })?;
            spec.set(weekday, hours)?;
        }
        Ok(spec)
    }
}

impl From<BusinessHoursSpec> for BTreeMap<String, RawDayHours> {
    fn from(spec: BusinessHoursSpec) -> Self {
        let mut out: BTreeMap<String, RawDayHours> = spec
            .days
            .into_iter()
            .map(|(day, hours)| (day.to_string(), hours.into()))
            .collect();
        if let Some(default) = spec.default {
            out.insert(DEFAULT_KEY.to_string(), default.into());
        }
        out
    }
}

impl TryFrom<RawDayHours> for DayHours {
    type Error = SchedulingError;

    fn try_from(raw: RawDayHours) -> Result<Self> {
        if raw.closed {
            return Ok(DayHours::Closed);
        }
        let (Some(open), Some(close)) = (raw.open, raw.close) else {
            return Err(SchedulingError::InputOutOfRange(
                "business hours entry needs both \"open\" and \"close\", or \"closed\": true"
                    .to_string(),
            ));
        };
        let open = parse_time_of_day(&open)?;
        if close.trim() == "24:00" {
            return Ok(DayHours::open_until_midnight(open));
        }
        DayHours::open(open, parse_time_of_day(&close)?)
    }
}

impl From<DayHours> for RawDayHours {
    fn from(hours: DayHours) -> Self {
        match hours {
            DayHours::Closed => RawDayHours {
                closed: true,
                ..RawDayHours::default()
            },
            DayHours::Open { open, close } => RawDayHours {
                open: Some(format_time_of_day(open)),
                close: Some(close.map_or_else(|| "24:00".to_string(), format_time_of_day)),
                closed: false,
            },
        }
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SchedulingError::InputOutOfRange(format!("'{s}' is not a time of day")))
}

fn format_time_of_day(t: NaiveTime) -> String {
    if t.second() == 0 {
        t.format("%H:%M").to_string()
    } else {
        t.format("%H:%M:%S").to_string()
    }
}
