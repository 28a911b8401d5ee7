//! Tests for slot search and next-slot lookup.

use availability_engine::interval::overlaps;
use availability_engine::slots::{find_available_slots, next_available_slot, SlotQuery};
use availability_engine::{
    AvailableSlot, BusinessHoursSpec, BusyInterval, DayHours, SchedulingError, TimeInterval,
};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(h: u32, m: u32) -> DateTime<Utc> {
    // 2026-03-16 is a Monday.
    Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
}

fn busy(id: &str, sh: u32, sm: u32, eh: u32, em: u32) -> BusyInterval {
    BusyInterval::new(id, at(sh, sm), at(eh, em)).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn utc_zone() -> Tz {
    "UTC".parse().unwrap()
}

fn starts(slots: &[AvailableSlot]) -> Vec<DateTime<Utc>> {
    slots.iter().map(|s| s.start).collect()
}

fn search(query: SlotQuery, busy: &[BusyInterval]) -> Vec<AvailableSlot> {
    find_available_slots(&query, busy, &BusinessHoursSpec::always_open(), &utc_zone()).unwrap()
}

// ── Reference scenarios ─────────────────────────────────────────────────────

#[test]
fn empty_calendar_yields_hourly_slots() {
    let slots = search(SlotQuery::new(at(9, 0), at(17, 0), 60), &[]);

    assert_eq!(slots.len(), 8);
    for (i, slot) in slots.iter().enumerate() {
        assert_eq!(slot.start, at(9 + i as u32, 0));
        assert_eq!(slot.end, at(10 + i as u32, 0));
        assert_eq!(slot.duration_minutes, 60);
    }
}

#[test]
fn one_busy_hour_removes_one_slot() {
    let blocked = busy("meeting", 10, 0, 11, 0);
    let slots = search(SlotQuery::new(at(9, 0), at(17, 0), 60), std::slice::from_ref(&blocked));

    assert_eq!(slots.len(), 7);
    for slot in &slots {
        assert!(!overlaps(&slot.interval().unwrap(), &blocked.interval));
    }
    assert_eq!(
        starts(&slots),
        vec![at(9, 0), at(11, 0), at(12, 0), at(13, 0), at(14, 0), at(15, 0), at(16, 0)]
    );
}

// ── Busy handling ───────────────────────────────────────────────────────────

#[test]
fn slot_may_touch_busy_interval() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(11, 0), 60),
        &[busy("a", 8, 0, 9, 0), busy("b", 11, 0, 12, 0)],
    );
    assert_eq!(starts(&slots), vec![at(9, 0), at(10, 0)]);
}

#[test]
fn cursor_skips_to_end_of_blocking_interval() {
    // 09:20-09:50 blocks the first candidate; the next starts at 09:50.
    let slots = search(
        SlotQuery::new(at(9, 0), at(12, 0), 60),
        &[busy("a", 9, 20, 9, 50)],
    );
    assert_eq!(starts(&slots), vec![at(9, 50), at(10, 50)]);
}

#[test]
fn overlapping_busy_intervals_need_no_merging() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(13, 0), 60),
        &[busy("b", 10, 30, 11, 30), busy("a", 9, 30, 10, 45)],
    );
    assert_eq!(starts(&slots), vec![at(11, 30)]);
}

#[test]
fn unsorted_busy_input_is_handled() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(17, 0), 60),
        &[busy("late", 15, 0, 16, 0), busy("early", 9, 0, 10, 0)],
    );
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0].start, at(10, 0));
    assert!(!starts(&slots).contains(&at(15, 0)));
}

#[test]
fn buffer_is_enforced_around_busy_intervals() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(17, 0), 60).with_buffer(15),
        &[busy("meeting", 10, 0, 11, 0)],
    );
    // Busy expands to 09:45-11:15.
    assert_eq!(
        starts(&slots),
        vec![at(11, 15), at(12, 15), at(13, 15), at(14, 15), at(15, 15)]
    );
    for slot in &slots {
        assert!(slot.start - at(11, 0) >= Duration::minutes(15));
    }
}

#[test]
fn busy_outside_window_is_ignored() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(12, 0), 60),
        &[busy("before", 6, 0, 7, 0), busy("after", 13, 0, 14, 0)],
    );
    assert_eq!(slots.len(), 3);
}

#[test]
fn fully_busy_window_yields_nothing() {
    let slots = search(
        SlotQuery::new(at(9, 0), at(17, 0), 30),
        &[busy("all-day", 8, 0, 18, 0)],
    );
    assert!(slots.is_empty());
}

// ── Window edges ────────────────────────────────────────────────────────────

#[test]
fn slots_never_pass_window_end() {
    let slots = search(SlotQuery::new(at(9, 0), at(11, 30), 60), &[]);
    assert_eq!(starts(&slots), vec![at(9, 0), at(10, 0)]);
    assert!(slots.iter().all(|s| s.end <= at(11, 30)));
}

#[test]
fn duration_longer_than_window_yields_nothing() {
    let slots = search(SlotQuery::new(at(9, 0), at(9, 30), 60), &[]);
    assert!(slots.is_empty());
}

#[test]
fn invalid_queries_rejected() {
    let hours = BusinessHoursSpec::always_open();
    let tz = utc_zone();

    let inverted = SlotQuery::new(at(17, 0), at(9, 0), 60);
    assert!(matches!(
        find_available_slots(&inverted, &[], &hours, &tz),
        Err(SchedulingError::InvalidInterval { .. })
    ));

    let zero = SlotQuery::new(at(9, 0), at(17, 0), 0);
    assert!(matches!(
        find_available_slots(&zero, &[], &hours, &tz),
        Err(SchedulingError::InputOutOfRange(_))
    ));

    let negative_buffer = SlotQuery::new(at(9, 0), at(17, 0), 30).with_buffer(-1);
    assert!(matches!(
        find_available_slots(&negative_buffer, &[busy("a", 10, 0, 11, 0)], &hours, &tz),
        Err(SchedulingError::InputOutOfRange(_))
    ));
    assert!(matches!(
        find_available_slots(&negative_buffer, &[], &hours, &tz),
        Err(SchedulingError::InputOutOfRange(_))
    ));
}

#[test]
fn unrepresentable_duration_rejected() {
    let hours = BusinessHoursSpec::always_open();
    for minutes in [i64::MAX / 2, i64::MAX] {
        let query = SlotQuery::new(at(9, 0), at(17, 0), minutes);
        assert!(matches!(
            find_available_slots(&query, &[], &hours, &utc_zone()),
            Err(SchedulingError::InputOutOfRange(_))
        ));
    }
}

#[test]
fn huge_representable_duration_finds_nothing() {
    // A valid duration that runs past the end of the supported date range.
    let query = SlotQuery::new(at(9, 0), at(17, 0), 100_000_000_000_000);
    assert!(search(query, &[]).is_empty());
}

#[test]
fn unrepresentable_buffer_rejected() {
    let hours = BusinessHoursSpec::always_open();
    let meeting = [busy("meeting", 10, 0, 11, 0)];
    for buffer in [i64::MAX / 2, i64::MAX, 100_000_000_000_000] {
        let query = SlotQuery::new(at(9, 0), at(17, 0), 60).with_buffer(buffer);
        assert!(matches!(
            find_available_slots(&query, &meeting, &hours, &utc_zone()),
            Err(SchedulingError::InputOutOfRange(_))
        ));
    }
}

// ── Business hours ──────────────────────────────────────────────────────────

#[test]
fn slot_ending_exactly_at_close_is_accepted() {
    let hours = BusinessHoursSpec::new().with_default(DayHours::open(hm(9, 0), hm(12, 0)).unwrap());
    let query = SlotQuery::new(at(8, 0), at(13, 0), 60);
    let slots = find_available_slots(&query, &[], &hours, &utc_zone()).unwrap();
    assert_eq!(starts(&slots), vec![at(9, 0), at(10, 0), at(11, 0)]);
}

#[test]
fn candidates_straddling_opening_are_not_split() {
    let hours =
        BusinessHoursSpec::new().with_default(DayHours::open(hm(9, 30), hm(17, 0)).unwrap());
    let query = SlotQuery::new(at(9, 0), at(17, 0), 60);
    let slots = find_available_slots(&query, &[], &hours, &utc_zone()).unwrap();
    assert_eq!(
        starts(&slots),
        vec![at(9, 30), at(10, 30), at(11, 30), at(12, 30), at(13, 30), at(14, 30), at(15, 30)]
    );
}

#[test]
fn closed_day_yields_nothing() {
    let hours = BusinessHoursSpec::standard_weekdays();
    // 2026-03-15 is a Sunday.
    let query = SlotQuery::new(
        Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap(),
        30,
    );
    let slots = find_available_slots(&query, &[], &hours, &utc_zone()).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn business_hours_follow_provider_zone() {
    let hours = BusinessHoursSpec::standard_weekdays();
    let tz: Tz = "America/New_York".parse().unwrap();
    // Whole Monday in UTC; New York is open 13:00-21:00 UTC (EDT).
    let query = SlotQuery::new(at(0, 0), at(23, 59), 120);
    let slots = find_available_slots(&query, &[], &hours, &tz).unwrap();
    assert_eq!(starts(&slots), vec![at(13, 0), at(15, 0), at(17, 0), at(19, 0)]);
}

// ── next_available_slot ─────────────────────────────────────────────────────

#[test]
fn next_slot_is_immediate_when_free() {
    let slot = next_available_slot(
        at(10, 0),
        30,
        &[],
        &BusinessHoursSpec::always_open(),
        &utc_zone(),
        0,
        30,
    )
    .unwrap()
    .expect("a free calendar has a slot");
    assert_eq!(slot.start, at(10, 0));
    assert_eq!(slot.end, at(10, 30));
}

#[test]
fn next_slot_skips_weekend() {
    // Saturday 10:00 UTC; the next weekday opening is Monday 09:00 UTC.
    let from = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
    let slot = next_available_slot(
        from,
        30,
        &[],
        &BusinessHoursSpec::standard_weekdays(),
        &utc_zone(),
        0,
        30,
    )
    .unwrap()
    .expect("Monday is open");
    assert_eq!(slot.start, at(9, 0));
    assert_eq!(slot.duration_minutes, 30);
}

#[test]
fn next_slot_respects_busy_and_buffer() {
    let slot = next_available_slot(
        at(9, 0),
        60,
        &[busy("a", 9, 0, 10, 0)],
        &BusinessHoursSpec::always_open(),
        &utc_zone(),
        10,
        30,
    )
    .unwrap()
    .unwrap();
    assert_eq!(slot.start, at(10, 10));
}

#[test]
fn next_slot_returns_none_when_horizon_exhausted() {
    let from = at(0, 0);
    let blocked = BusyInterval::new("leave", from, from + Duration::days(40)).unwrap();
    let slot = next_available_slot(
        from,
        30,
        &[blocked],
        &BusinessHoursSpec::always_open(),
        &utc_zone(),
        0,
        30,
    )
    .unwrap();
    assert!(slot.is_none());
}

#[test]
fn next_slot_finds_opening_after_long_block() {
    let from = at(0, 0);
    let blocked = BusyInterval::new("leave", from, from + Duration::days(10)).unwrap();
    let slot = next_available_slot(
        from,
        30,
        &[blocked],
        &BusinessHoursSpec::always_open(),
        &utc_zone(),
        0,
        30,
    )
    .unwrap()
    .unwrap();
    assert_eq!(slot.start, from + Duration::days(10));
}

#[test]
fn next_slot_longer_than_a_day_never_fits() {
    let slot = next_available_slot(
        at(0, 0),
        25 * 60,
        &[],
        &BusinessHoursSpec::always_open(),
        &utc_zone(),
        0,
        30,
    )
    .unwrap();
    assert!(slot.is_none());
}

#[test]
fn next_slot_rejects_unrepresentable_input() {
    let hours = BusinessHoursSpec::always_open();
    let meeting = [busy("meeting", 10, 0, 11, 0)];
    assert!(matches!(
        next_available_slot(at(9, 0), i64::MAX / 2, &[], &hours, &utc_zone(), 0, 30),
        Err(SchedulingError::InputOutOfRange(_))
    ));
    assert!(matches!(
        next_available_slot(at(9, 0), 30, &meeting, &hours, &utc_zone(), i64::MAX / 2, 30),
        Err(SchedulingError::InputOutOfRange(_))
    ));
}

#[test]
fn slot_interval_roundtrip() {
    let slot = AvailableSlot::from(TimeInterval::new(at(9, 0), at(9, 45)).unwrap());
    assert_eq!(slot.duration_minutes, 45);
    assert_eq!(slot.interval().unwrap().end(), at(9, 45));
}
