//! WASM bindings for availability-engine.
//!
//! Exposes slot finding, recurrence expansion, business-hours checks and
//! timezone conversion to JavaScript via `wasm-bindgen`. All complex types are
//! passed as JSON strings using the engine's camelCase serde shapes.
//!
//! Each export is a thin wrapper over a plain Rust function returning
//! `Result<String, String>`, so the JSON contract is testable natively.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p availability-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/availability-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/availability_engine_wasm.wasm
//! ```

use std::sync::OnceLock;

use availability_engine::timezone::parse_instant;
use availability_engine::{
    BusinessHoursSpec, BusyInterval, RecurrenceRule, SchedulingEngine, SchedulingError, SlotQuery,
    TimeInterval,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// One engine per module instance, so the timezone cache is shared by calls.
fn engine() -> &'static SchedulingEngine {
    static ENGINE: OnceLock<SchedulingEngine> = OnceLock::new();
    ENGINE.get_or_init(SchedulingEngine::new)
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Input for `findAvailableSlots`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotRequest {
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration_minutes: i64,
    #[serde(default)]
    buffer_minutes: Option<i64>,
    #[serde(default)]
    busy: Vec<BusyInterval>,
    business_hours: BusinessHoursSpec,
    time_zone: String,
}

#[derive(Serialize)]
struct DateList(Vec<String>);

impl From<Vec<NaiveDate>> for DateList {
    fn from(dates: Vec<NaiveDate>) -> Self {
        Self(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn engine_err(e: SchedulingError) -> String {
    e.to_string()
}

fn parse_json<T: for<'de> Deserialize<'de>>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {what} JSON: {e}"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {e}"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}': {e}"))
}

fn buffer_arg(buffer_minutes: Option<i32>) -> Option<i64> {
    buffer_minutes.map(i64::from)
}

// ---------------------------------------------------------------------------
// JSON operations
// ---------------------------------------------------------------------------

pub fn convert_time_zone_json(
    datetime: &str,
    source_tz: &str,
    target_tz: &str,
) -> Result<String, String> {
    let converted = engine()
        .convert_time_zone(datetime, source_tz, target_tz)
        .map_err(engine_err)?;
    to_json(&converted)
}

pub fn find_available_slots_json(request_json: &str) -> Result<String, String> {
    let request: SlotRequest = parse_json("slot request", request_json)?;
    let mut query = SlotQuery::new(
        request.window_start,
        request.window_end,
        request.duration_minutes,
    );
    query.buffer_minutes = request.buffer_minutes;
    let slots = engine()
        .find_available_slots(
            &query,
            &request.busy,
            &request.business_hours,
            &request.time_zone,
        )
        .map_err(engine_err)?;
    to_json(&slots)
}

pub fn next_available_slot_json(
    from: &str,
    duration_minutes: i64,
    busy_json: &str,
    time_zone: &str,
) -> Result<String, String> {
    let from = parse_instant(from).map_err(engine_err)?;
    let busy: Vec<BusyInterval> = parse_json("busy", busy_json)?;
    let slot = engine()
        .get_next_available_slot(from, duration_minutes, &busy, time_zone)
        .map_err(engine_err)?;
    to_json(&slot)
}

pub fn generate_occurrences_json(rule_json: &str) -> Result<String, String> {
    let rule: RecurrenceRule = parse_json("recurrence rule", rule_json)?;
    let dates = engine()
        .generate_recurring_occurrences(&rule)
        .map_err(engine_err)?;
    to_json(&DateList::from(dates))
}

pub fn expand_rrule_json(rrule: &str, bound_start: &str, bound_end: &str) -> Result<String, String> {
    let dates = engine()
        .expand_rrule(rrule, parse_date(bound_start)?, parse_date(bound_end)?)
        .map_err(engine_err)?;
    to_json(&DateList::from(dates))
}

pub fn check_conflicts_json(
    candidate_json: &str,
    busy_json: &str,
    buffer_minutes: Option<i64>,
) -> Result<String, String> {
    let candidate: TimeInterval = parse_json("candidate", candidate_json)?;
    let busy: Vec<BusyInterval> = parse_json("busy", busy_json)?;
    let conflicts = engine()
        .check_conflicts(&candidate, &busy, buffer_minutes)
        .map_err(engine_err)?;
    to_json(&conflicts)
}

pub fn find_free_windows_json(
    window_json: &str,
    busy_json: &str,
    buffer_minutes: Option<i64>,
) -> Result<String, String> {
    let window: TimeInterval = parse_json("window", window_json)?;
    let busy: Vec<BusyInterval> = parse_json("busy", busy_json)?;
    let free = engine()
        .find_free_windows(&window, &busy, buffer_minutes)
        .map_err(engine_err)?;
    to_json(&free)
}

pub fn is_within_business_hours_json(
    instant: &str,
    hours_json: &str,
    time_zone: &str,
) -> Result<bool, String> {
    let instant = parse_instant(instant).map_err(engine_err)?;
    let hours: BusinessHoursSpec = parse_json("business hours", hours_json)?;
    engine()
        .is_within_business_hours(instant, &hours, time_zone)
        .map_err(engine_err)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

fn js_err(e: String) -> JsValue {
    JsValue::from_str(&e)
}

/// Whether `time_zone` is a known IANA identifier.
#[wasm_bindgen(js_name = "validateTimeZone")]
pub fn validate_time_zone(time_zone: &str) -> bool {
    engine().validate_time_zone(time_zone)
}

/// Convert an ISO 8601 datetime between zones.
///
/// Returns `{utc, local, timezone, utcOffset, dstActive}` as JSON.
#[wasm_bindgen(js_name = "convertTimeZone")]
pub fn convert_time_zone(datetime: &str, source_tz: &str, target_tz: &str) -> Result<String, JsValue> {
    convert_time_zone_json(datetime, source_tz, target_tz).map_err(js_err)
}

/// Find bookable slots.
///
/// `request_json` is `{windowStart, windowEnd, durationMinutes, bufferMinutes?,
/// busy: [{sourceId, start, end}], businessHours, timeZone}`. Returns an array
/// of `{start, end, durationMinutes}`.
#[wasm_bindgen(js_name = "findAvailableSlots")]
pub fn find_available_slots(request_json: &str) -> Result<String, JsValue> {
    find_available_slots_json(request_json).map_err(js_err)
}

/// First slot at or after `from` under default weekday hours, or `null`.
#[wasm_bindgen(js_name = "getNextAvailableSlot")]
pub fn get_next_available_slot(
    from: &str,
    duration_minutes: i32,
    busy_json: &str,
    time_zone: &str,
) -> Result<String, JsValue> {
    next_available_slot_json(from, i64::from(duration_minutes), busy_json, time_zone)
        .map_err(js_err)
}

/// Expand `{type, interval, daysOfWeek?, dayOfMonth?, boundStart, boundEnd}`
/// into an array of `YYYY-MM-DD` dates.
#[wasm_bindgen(js_name = "generateRecurringOccurrences")]
pub fn generate_recurring_occurrences(rule_json: &str) -> Result<String, JsValue> {
    generate_occurrences_json(rule_json).map_err(js_err)
}

/// Expand an RFC 5545 RRULE string between two `YYYY-MM-DD` bounds.
#[wasm_bindgen(js_name = "expandRRule")]
pub fn expand_rrule(rrule: &str, bound_start: &str, bound_end: &str) -> Result<String, JsValue> {
    expand_rrule_json(rrule, bound_start, bound_end).map_err(js_err)
}

/// Busy intervals colliding with `candidate_json` (`{start, end}`).
#[wasm_bindgen(js_name = "checkConflicts")]
pub fn check_conflicts(
    candidate_json: &str,
    busy_json: &str,
    buffer_minutes: Option<i32>,
) -> Result<String, JsValue> {
    check_conflicts_json(candidate_json, busy_json, buffer_arg(buffer_minutes)).map_err(js_err)
}

/// Free gaps inside `window_json` (`{start, end}`).
#[wasm_bindgen(js_name = "findFreeWindows")]
pub fn find_free_windows(
    window_json: &str,
    busy_json: &str,
    buffer_minutes: Option<i32>,
) -> Result<String, JsValue> {
    find_free_windows_json(window_json, busy_json, buffer_arg(buffer_minutes)).map_err(js_err)
}

#[wasm_bindgen(js_name = "isWithinBusinessHours")]
pub fn is_within_business_hours(
    instant: &str,
    hours_json: &str,
    time_zone: &str,
) -> Result<bool, JsValue> {
    is_within_business_hours_json(instant, hours_json, time_zone).map_err(js_err)
}
