//! Recurrence rule expansion into concrete occurrence dates.
//!
//! A [`RecurrenceRule`] carries its own inclusive `[bound_start, bound_end]`
//! date range. Expansion is a pure function of the rule: the same rule always
//! yields the same ordered, de-duplicated dates, and [`Occurrences`] is a
//! `Clone` iterator so a sequence can be restarted from any saved copy.
//!
//! Weekdays are numbered 0 (Sunday) through 6 (Saturday), and weekly
//! intervals count weeks that start on Sunday.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Expansion fails rather than truncating past this many occurrences.
pub const DEFAULT_MAX_OCCURRENCES: usize = 5000;

const RRULE_WEEKDAYS: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RecurrenceType {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            _ => Err(SchedulingError::UnsupportedRecurrenceType(s.to_string())),
        }
    }
}

impl TryFrom<String> for RecurrenceType {
    type Error = SchedulingError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RecurrenceType> for String {
    fn from(kind: RecurrenceType) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
        })
    }
}

/// A recurrence pattern bounded by an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceType,
    /// Every `interval`-th day, week or month. Must be at least 1.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekly only. Defaults to the weekday of `bound_start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    /// Monthly only. Defaults to the day of `bound_start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    pub bound_start: NaiveDate,
    pub bound_end: NaiveDate,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    pub fn daily(interval: u32, bound_start: NaiveDate, bound_end: NaiveDate) -> Self {
        Self {
            kind: RecurrenceType::Daily,
            interval,
            days_of_week: None,
            day_of_month: None,
            bound_start,
            bound_end,
        }
    }

    pub fn weekly(
        interval: u32,
        days_of_week: impl Into<Vec<u8>>,
        bound_start: NaiveDate,
        bound_end: NaiveDate,
    ) -> Self {
        Self {
            kind: RecurrenceType::Weekly,
            days_of_week: Some(days_of_week.into()),
            ..Self::daily(interval, bound_start, bound_end)
        }
    }

    pub fn monthly(
        interval: u32,
        day_of_month: u32,
        bound_start: NaiveDate,
        bound_end: NaiveDate,
    ) -> Self {
        Self {
            kind: RecurrenceType::Monthly,
            day_of_month: Some(day_of_month),
            ..Self::daily(interval, bound_start, bound_end)
        }
    }

    /// Check ranges: `interval >= 1`, weekdays in 0-6 (and at least one),
    /// `day_of_month` in 1-31.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(SchedulingError::InputOutOfRange(
                "recurrence interval must be at least 1".to_string(),
            ));
        }
        if let Some(days) = &self.days_of_week {
            if days.is_empty() {
                return Err(SchedulingError::InputOutOfRange(
                    "daysOfWeek must name at least one weekday".to_string(),
                ));
            }
            if let Some(bad) = days.iter().find(|d| **d > 6) {
                return Err(SchedulingError::InputOutOfRange(format!(
                    "weekday must be 0-6, got {bad}"
                )));
            }
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(SchedulingError::InputOutOfRange(format!(
                    "dayOfMonth must be 1-31, got {day}"
                )));
            }
        }
        Ok(())
    }

    /// A restartable iterator over the rule's occurrence dates.
    pub fn occurrences(&self) -> Result<Occurrences> {
        self.validate()?;
        let pattern = match self.kind {
            RecurrenceType::Daily => Pattern::Daily,
            RecurrenceType::Weekly => {
                let mut weekdays = [false; 7];
                match &self.days_of_week {
                    Some(days) => days.iter().for_each(|d| weekdays[*d as usize] = true),
                    None => weekdays[sunday_index(self.bound_start)] = true,
                }
                Pattern::Weekly {
                    weekdays,
                    anchor_week: week_start(self.bound_start),
                }
            }
            RecurrenceType::Monthly => Pattern::Monthly {
                day: self.day_of_month.unwrap_or_else(|| self.bound_start.day()),
                month_offset: 0,
            },
        };
        Ok(Occurrences {
            pattern,
            interval: self.interval,
            cursor: Some(self.bound_start),
            bound_start: self.bound_start,
            bound_end: self.bound_end,
        })
    }

    /// Render the pattern as an RFC 5545 RRULE value (without DTSTART/UNTIL,
    /// which come from the bounds).
    pub fn to_rrule(&self) -> Result<String> {
        self.validate()?;
        let mut parts = vec![
            format!(
                "FREQ={}",
                match self.kind {
                    RecurrenceType::Daily => "DAILY",
                    RecurrenceType::Weekly => "WEEKLY",
                    RecurrenceType::Monthly => "MONTHLY",
                }
            ),
            format!("INTERVAL={}", self.interval),
        ];
        match self.kind {
            RecurrenceType::Daily => {}
            RecurrenceType::Weekly => {
                let mut days: Vec<usize> = match &self.days_of_week {
                    Some(days) => days.iter().map(|d| *d as usize).collect(),
                    None => vec![sunday_index(self.bound_start)],
                };
                days.sort_unstable();
                days.dedup();
                let byday: Vec<&str> = days.into_iter().map(|d| RRULE_WEEKDAYS[d]).collect();
                parts.push(format!("BYDAY={}", byday.join(",")));
                parts.push("WKST=SU".to_string());
            }
            RecurrenceType::Monthly => {
                let day = self.day_of_month.unwrap_or_else(|| self.bound_start.day());
                parts.push(format!("BYMONTHDAY={day}"));
            }
        }
        Ok(parts.join(";"))
    }
}

/// Expand `rule` into its occurrence dates, failing with `InputOutOfRange`
/// if it would produce more than [`DEFAULT_MAX_OCCURRENCES`].
pub fn expand(rule: &RecurrenceRule) -> Result<Vec<NaiveDate>> {
    expand_with_limit(rule, DEFAULT_MAX_OCCURRENCES)
}

/// Expand `rule`, failing if it would produce more than `limit` dates.
pub fn expand_with_limit(rule: &RecurrenceRule, limit: usize) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for date in rule.occurrences()? {
        if dates.len() == limit {
            return Err(SchedulingError::InputOutOfRange(format!(
                "recurrence produces more than {limit} occurrences"
            )));
        }
        dates.push(date);
    }
    Ok(dates)
}

#[derive(Debug, Clone)]
enum Pattern {
    Daily,
    Weekly {
        weekdays: [bool; 7],
        anchor_week: NaiveDate,
    },
    Monthly {
        day: u32,
        month_offset: u32,
    },
}

/// Occurrence dates of a [`RecurrenceRule`], in ascending order.
#[derive(Debug, Clone)]
pub struct Occurrences {
    pattern: Pattern,
    interval: u32,
    cursor: Option<NaiveDate>,
    bound_start: NaiveDate,
    bound_end: NaiveDate,
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        match &mut self.pattern {
            Pattern::Daily => {
                let date = self.cursor.filter(|d| *d <= self.bound_end)?;
                self.cursor = date.checked_add_days(Days::new(u64::from(self.interval)));
                Some(date)
            }
            Pattern::Weekly {
                weekdays,
                anchor_week,
            } => loop {
                let date = self.cursor.filter(|d| *d <= self.bound_end)?;
                let week = week_start(date);
                let weeks_elapsed = (week - *anchor_week).num_days() / 7;
                if weeks_elapsed % i64::from(self.interval) != 0 {
                    self.cursor = week.checked_add_days(Days::new(7));
                    continue;
                }
                self.cursor = date.succ_opt();
                if weekdays[sunday_index(date)] {
                    return Some(date);
                }
            },
            Pattern::Monthly { day, month_offset } => loop {
                let (year, month) = add_months(self.bound_start, *month_offset)?;
                if NaiveDate::from_ymd_opt(year, month, 1)? > self.bound_end {
                    return None;
                }
                *month_offset = month_offset.checked_add(self.interval)?;
                // Months shorter than `day` are skipped, never clamped.
                match NaiveDate::from_ymd_opt(year, month, *day) {
                    Some(date) if date >= self.bound_start && date <= self.bound_end => {
                        return Some(date)
                    }
                    _ => continue,
                }
            },
        }
    }
}

fn sunday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// The Sunday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
        .unwrap_or(NaiveDate::MIN)
}

/// `(year, month)` of the month `offset` months after `date`'s month.
fn add_months(date: NaiveDate, offset: u32) -> Option<(i32, u32)> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(offset);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}
