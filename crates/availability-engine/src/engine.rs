//! The public scheduling surface used by booking and calendar callers.
//!
//! [`SchedulingEngine`] is constructed once per process and shared (it is
//! `Send + Sync`). Its only state is the timezone cache and its
//! [`EngineConfig`]; every method is otherwise a pure function of its inputs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::business_hours::{self, BusinessHoursSpec};
use crate::config::EngineConfig;
use crate::conflict::{self, Conflict};
use crate::dst::{self, DstPolicy};
use crate::error::Result;
use crate::expander;
use crate::freebusy;
use crate::interval::{self, AvailableSlot, BusyInterval, TimeInterval};
use crate::recurrence::{self, RecurrenceRule};
use crate::slots::{self, SlotQuery};
use crate::timezone::{self, ConvertedDatetime, TimeInput, TimeZoneRegistry};

#[derive(Debug, Default)]
pub struct SchedulingEngine {
    time_zones: TimeZoneRegistry,
    config: EngineConfig,
}

impl SchedulingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            time_zones: TimeZoneRegistry::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time_zones(&self) -> &TimeZoneRegistry {
        &self.time_zones
    }

    // ── Timezones ───────────────────────────────────────────────────────────

    pub fn validate_time_zone(&self, id: &str) -> bool {
        self.time_zones.is_valid_time_zone(id)
    }

    /// Convert an ISO-8601 datetime from `source_tz` to `target_tz`.
    ///
    /// An input with an offset (`2025-01-15T12:00:00Z`) is already an instant;
    /// a naive input (`2025-01-15T12:00:00`) is read as wall-clock time in
    /// `source_tz` first.
    ///
    /// ```
    /// use availability_engine::SchedulingEngine;
    ///
    /// let engine = SchedulingEngine::new();
    /// let out = engine
    ///     .convert_time_zone("2025-01-15T12:00:00Z", "UTC", "America/New_York")
    ///     .unwrap();
    /// assert_eq!(out.local, "2025-01-15T07:00:00-05:00");
    /// ```
    pub fn convert_time_zone(
        &self,
        datetime: &str,
        source_tz: &str,
        target_tz: &str,
    ) -> Result<ConvertedDatetime> {
        let local = match timezone::parse_time_input(datetime)? {
            TimeInput::Instant(instant) => self.time_zones.convert(instant, source_tz, target_tz)?,
            TimeInput::WallClock(naive) => {
                self.time_zones.convert_wall_clock(naive, source_tz, target_tz)?
            }
        };
        Ok(ConvertedDatetime::new(&local))
    }

    /// Typed form of [`convert_time_zone`](Self::convert_time_zone).
    pub fn convert_instant(
        &self,
        instant: DateTime<Utc>,
        source_tz: &str,
        target_tz: &str,
    ) -> Result<DateTime<Tz>> {
        self.time_zones.convert(instant, source_tz, target_tz)
    }

    pub fn localize(&self, instant: DateTime<Utc>, tz: &str) -> Result<DateTime<Tz>> {
        self.time_zones.localize(instant, tz)
    }

    pub fn combine(&self, date: NaiveDate, time: NaiveTime, tz: &str) -> Result<DateTime<Utc>> {
        self.time_zones.combine(date, time, tz)
    }

    // ── Slots ───────────────────────────────────────────────────────────────

    /// Bookable slots in the query window. A query without a buffer uses the
    /// configured default.
    pub fn find_available_slots(
        &self,
        query: &SlotQuery,
        busy: &[BusyInterval],
        hours: &BusinessHoursSpec,
        tz: &str,
    ) -> Result<Vec<AvailableSlot>> {
        let zone = self.time_zones.resolve(tz)?;
        let query = SlotQuery {
            buffer_minutes: Some(self.buffer_or_default(query.buffer_minutes)),
            ..*query
        };
        slots::find_available_slots(&query, busy, hours, &zone)
    }

    /// First slot at or after `from` under the configured default business
    /// hours, or `None` if the horizon holds no fit.
    pub fn get_next_available_slot(
        &self,
        from: DateTime<Utc>,
        duration_minutes: i64,
        busy: &[BusyInterval],
        tz: &str,
    ) -> Result<Option<AvailableSlot>> {
        self.get_next_available_slot_with_hours(
            from,
            duration_minutes,
            busy,
            &self.config.default_business_hours,
            tz,
        )
    }

    pub fn get_next_available_slot_with_hours(
        &self,
        from: DateTime<Utc>,
        duration_minutes: i64,
        busy: &[BusyInterval],
        hours: &BusinessHoursSpec,
        tz: &str,
    ) -> Result<Option<AvailableSlot>> {
        let zone = self.time_zones.resolve(tz)?;
        slots::next_available_slot(
            from,
            duration_minutes,
            busy,
            hours,
            &zone,
            self.config.default_buffer_minutes,
            self.config.next_slot_horizon_days,
        )
    }

    /// Free gaps in `window` once busy intervals and their buffers are removed.
    pub fn find_free_windows(
        &self,
        window: &TimeInterval,
        busy: &[BusyInterval],
        buffer_minutes: Option<i64>,
    ) -> Result<Vec<TimeInterval>> {
        freebusy::free_windows(busy, window, self.buffer_or_default(buffer_minutes))
    }

    /// Busy intervals that `candidate` collides with. Empty means the booking
    /// can be accepted.
    pub fn check_conflicts(
        &self,
        candidate: &TimeInterval,
        busy: &[BusyInterval],
        buffer_minutes: Option<i64>,
    ) -> Result<Vec<Conflict>> {
        conflict::find_conflicts(candidate, busy, self.buffer_or_default(buffer_minutes))
    }

    // ── Recurrence ──────────────────────────────────────────────────────────

    pub fn generate_recurring_occurrences(&self, rule: &RecurrenceRule) -> Result<Vec<NaiveDate>> {
        recurrence::expand_with_limit(rule, self.config.max_occurrences)
    }

    /// Expand an RFC 5545 RRULE string within `[bound_start, bound_end]`.
    pub fn expand_rrule(
        &self,
        rrule: &str,
        bound_start: NaiveDate,
        bound_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        expander::expand_rrule_dates(rrule, bound_start, bound_end, self.config.max_occurrences)
    }

    /// Turn each occurrence date into a concrete interval starting at
    /// `start_time` local to `tz`.
    ///
    /// With [`DstPolicy::Reject`], a start time that is repeated or skipped on
    /// any occurrence date fails the whole call.
    pub fn materialize_occurrences(
        &self,
        rule: &RecurrenceRule,
        start_time: NaiveTime,
        duration_minutes: i64,
        tz: &str,
        policy: DstPolicy,
    ) -> Result<Vec<TimeInterval>> {
        let zone = self.time_zones.resolve(tz)?;
        self.generate_recurring_occurrences(rule)?
            .into_iter()
            .map(|date| {
                let start = dst::resolve_local(&zone, date.and_time(start_time), policy)?;
                TimeInterval::starting_at(start.with_timezone(&Utc), duration_minutes)
            })
            .collect()
    }

    // ── Business hours & intervals ──────────────────────────────────────────

    pub fn is_within_business_hours(
        &self,
        instant: DateTime<Utc>,
        hours: &BusinessHoursSpec,
        tz: &str,
    ) -> Result<bool> {
        let zone = self.time_zones.resolve(tz)?;
        Ok(business_hours::is_open(instant, hours, &zone))
    }

    pub fn overlaps(&self, a: &TimeInterval, b: &TimeInterval) -> bool {
        interval::overlaps(a, b)
    }

    pub fn duration_minutes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        interval::duration_minutes(start, end)
    }

    fn buffer_or_default(&self, buffer_minutes: Option<i64>) -> i64 {
        buffer_minutes.unwrap_or(self.config.default_buffer_minutes)
    }
}
