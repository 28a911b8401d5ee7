//! Tests for booking conflict detection.

use availability_engine::{find_conflicts, BusyInterval, SchedulingError, TimeInterval};
use chrono::{TimeZone, Utc};

/// Interval on 2026-03-01 from hour/minute ranges.
fn span(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> TimeInterval {
    TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 1, start_hour, start_min, 0)
            .unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 1, end_hour, end_min, 0)
            .unwrap(),
    )
    .unwrap()
}

fn busy(
    id: &str,
    start_hour: u32,
    start_min: u32,
    end_hour: u32,
    end_min: u32,
) -> BusyInterval {
    let i = span(start_hour, start_min, end_hour, end_min);
    BusyInterval::new(id, i.start(), i.end()).unwrap()
}

#[test]
fn overlapping_busy_interval_detected() {
    // Candidate 09:00-10:00, busy 09:30-10:30 → 30-min overlap
    let candidate = span(9, 0, 10, 0);
    let conflicts = find_conflicts(&candidate, &[busy("cal-a", 9, 30, 10, 30)], 0).unwrap();

    assert_eq!(conflicts.len(), 1, "should detect exactly one conflict");
    assert_eq!(conflicts[0].source_id, "cal-a");
    assert_eq!(conflicts[0].overlap_minutes, 30);
}

#[test]
fn non_overlapping_busy_no_conflict() {
    let candidate = span(9, 0, 10, 0);
    let conflicts = find_conflicts(&candidate, &[busy("cal-a", 11, 0, 12, 0)], 0).unwrap();
    assert!(
        conflicts.is_empty(),
        "non-overlapping intervals should not be conflicts"
    );
}

#[test]
fn adjacent_busy_not_a_conflict() {
    // Candidate 09:00-10:00, busy 10:00-11:00 → adjacent, NOT overlapping
    let candidate = span(9, 0, 10, 0);
    let conflicts = find_conflicts(
        &candidate,
        &[busy("after", 10, 0, 11, 0), busy("before", 8, 0, 9, 0)],
        0,
    )
    .unwrap();
    assert!(
        conflicts.is_empty(),
        "adjacent intervals (end == start) should not be conflicts"
    );
}

#[test]
fn buffer_turns_adjacent_into_conflict() {
    let candidate = span(9, 0, 10, 0);
    let conflicts = find_conflicts(&candidate, &[busy("after", 10, 0, 11, 0)], 10).unwrap();

    assert_eq!(conflicts.len(), 1);
    // The reported interval is the expanded one: 09:50-11:10.
    assert_eq!(conflicts[0].busy, span(9, 50, 11, 10));
    assert_eq!(conflicts[0].overlap_minutes, 10);
}

#[test]
fn multiple_conflicts_reported_in_input_order() {
    let candidate = span(9, 0, 15, 0);
    let entries = vec![
        busy("late", 14, 30, 15, 30),
        busy("free", 16, 0, 17, 0),
        busy("early", 8, 30, 9, 30),
    ];

    let conflicts = find_conflicts(&candidate, &entries, 0).unwrap();

    let ids: Vec<&str> = conflicts.iter().map(|c| c.source_id.as_str()).collect();
    assert_eq!(ids, vec!["late", "early"]);
    assert_eq!(conflicts[0].overlap_minutes, 30);
    assert_eq!(conflicts[1].overlap_minutes, 30);
}

#[test]
fn fully_contained_busy_correct_overlap() {
    // Candidate 09:00-12:00, busy 10:00-11:00 fully inside
    let candidate = span(9, 0, 12, 0);
    let conflicts = find_conflicts(&candidate, &[busy("inner", 10, 0, 11, 0)], 0).unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(
        conflicts[0].overlap_minutes, 60,
        "overlap should be the duration of the smaller interval"
    );
}

#[test]
fn empty_busy_list_no_conflicts() {
    let conflicts = find_conflicts(&span(9, 0, 10, 0), &[], 0).unwrap();
    assert!(conflicts.is_empty());
}

#[test]
fn negative_buffer_rejected() {
    let err = find_conflicts(&span(9, 0, 10, 0), &[busy("a", 9, 0, 10, 0)], -5).unwrap_err();
    assert!(matches!(err, SchedulingError::InputOutOfRange(_)));
}

#[test]
fn conflict_serializes_camel_case() {
    let conflicts = find_conflicts(&span(9, 0, 10, 0), &[busy("cal-a", 9, 30, 10, 30)], 0).unwrap();
    let json = serde_json::to_value(&conflicts[0]).unwrap();

    assert_eq!(json["sourceId"], "cal-a");
    assert_eq!(json["overlapMinutes"], 30);
    assert!(json["busy"]["start"].is_string());
}

#[test]
fn unrepresentable_buffer_rejected() {
    let err = find_conflicts(&span(9, 0, 10, 0), &[busy("a", 11, 0, 12, 0)], i64::MAX / 2)
        .unwrap_err();
    assert!(matches!(err, SchedulingError::InputOutOfRange(_)));
}
