//! Tests for the interval primitive, its wire format, and slot formatting.

use chrono::{DateTime, TimeZone, Utc};
use schedule_engine::event::{events_from_json, events_to_json};
use schedule_engine::format::{
    format_candidate_summary, format_slot, format_slot_with_date, format_time,
};
use schedule_engine::{
    detect, overlaps, with_buffer, CandidateInterval, Company, ConfirmedInterval, ConflictScope,
    Event, EventStatus, SelectionStage, SchedulingError, TimeInterval,
};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, hour, min, 0).unwrap()
}

fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
    TimeInterval::new(at(sh, sm), at(eh, em)).unwrap()
}

#[test]
fn touching_intervals_do_not_overlap() {
    let a = slot(10, 0, 11, 0);
    let b = slot(11, 0, 12, 0);
    assert!(!overlaps(&a, &b));
    assert!(!overlaps(&b, &a));
}

#[test]
fn partial_overlap_detected_both_ways() {
    let a = slot(10, 0, 11, 0);
    let b = slot(10, 59, 12, 0);
    assert!(overlaps(&a, &b));
    assert!(overlaps(&b, &a));
}

#[test]
fn contained_interval_overlaps() {
    let outer = slot(9, 0, 12, 0);
    let inner = slot(10, 0, 10, 30);
    assert!(outer.overlaps(&inner));
    assert!(inner.overlaps(&outer));
}

#[test]
fn buffer_expands_both_sides() {
    let buffered = with_buffer(&slot(10, 0, 11, 0), 30);
    assert_eq!(buffered, slot(9, 30, 11, 30));
}

#[test]
fn zero_buffer_is_identity() {
    let s = slot(10, 0, 11, 0);
    assert_eq!(s.with_buffer(0), s);
}

#[test]
fn empty_interval_rejected() {
    let err = TimeInterval::new(at(10, 0), at(10, 0)).unwrap_err();
    assert_eq!(
        err,
        SchedulingError::InvalidRange {
            start: at(10, 0),
            end: at(10, 0)
        }
    );
}

#[test]
fn reversed_interval_rejected() {
    assert!(matches!(
        CandidateInterval::new(at(11, 0), at(10, 0)),
        Err(SchedulingError::InvalidRange { .. })
    ));
}

#[test]
fn starting_at_uses_minutes() {
    let s = TimeInterval::starting_at(at(9, 45), 30).unwrap();
    assert_eq!(s.end(), at(10, 15));
    assert_eq!(s.duration_minutes(), 30);
}

#[test]
fn contains_inclusive_includes_both_ends() {
    let s = slot(9, 0, 10, 0);
    assert!(s.contains_inclusive(at(9, 0)));
    assert!(s.contains_inclusive(at(10, 0)));
    assert!(!s.contains_inclusive(at(10, 1)));
}

#[test]
fn event_json_uses_start_time_and_end_time() {
    let json = r#"[{
        "id": "e1",
        "company_id": "c1",
        "company_name": "Acme",
        "title": "First interview",
        "type": "interview",
        "status": "candidate",
        "candidate_slots": [
            {"start_time": "2024-02-01T13:00:00Z", "end_time": "2024-02-01T14:00:00Z"},
            {"start_time": "2024-02-01T09:00:00Z", "end_time": "2024-02-01T10:00:00Z"}
        ],
        "interview_duration": 45
    }]"#;

    let events = events_from_json(json).unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.status, EventStatus::Candidate);
    assert_eq!(event.interview_duration.minutes(), 45);
    // Loaded windows are sorted.
    assert_eq!(event.candidate_slots[0].start(), at(9, 0));
    assert_eq!(event.candidate_slots[1].start(), at(13, 0));

    let back = events_to_json(&events).unwrap();
    assert!(back.contains("\"start_time\""));
    assert!(back.contains("\"type\": \"interview\""));
    assert!(!back.contains("confirmed_slot"));
}

#[test]
fn event_json_with_reversed_slot_is_rejected() {
    let json = r#"[{
        "id": "e1", "company_id": "c1", "company_name": "Acme", "title": "x",
        "candidate_slots": [
            {"start_time": "2024-02-01T14:00:00Z", "end_time": "2024-02-01T13:00:00Z"}
        ]
    }]"#;
    assert!(matches!(
        events_from_json(json),
        Err(SchedulingError::Store(_))
    ));
}

#[test]
fn event_json_with_out_of_bounds_duration_is_rejected() {
    let json = r#"[{
        "id": "e1", "company_id": "c1", "company_name": "Acme", "title": "x",
        "interview_duration": 10
    }]"#;
    assert!(events_from_json(json).is_err());
}

#[test]
fn format_in_utc() {
    let s = slot(10, 0, 11, 0);
    assert_eq!(format_time(s.start(), chrono_tz::UTC), "10:00");
    assert_eq!(format_slot(&s, chrono_tz::UTC), "10:00-11:00");
    // 2024-02-01 is a Thursday.
    assert_eq!(format_slot_with_date(&s, chrono_tz::UTC), "2/1(Thu) 10:00-11:00");
}

#[test]
fn format_in_tokyo() {
    let s = slot(10, 0, 11, 0);
    assert_eq!(
        format_slot_with_date(&s, chrono_tz::Asia::Tokyo),
        "2/1(Thu) 19:00-20:00"
    );
}

#[test]
fn stale_confirmed_slot_on_rejected_event_is_dropped() {
    let json = r#"[{
        "id": "r1", "company_id": "c1", "company_name": "Acme", "title": "x",
        "status": "rejected",
        "candidate_slots": [
            {"start_time": "2024-02-01T10:00:00Z", "end_time": "2024-02-01T11:00:00Z"}
        ],
        "confirmed_slot": {"start_time": "2024-02-01T10:00:00Z", "end_time": "2024-02-01T11:00:00Z"}
    }]"#;

    let events = events_from_json(json).unwrap();

    assert_eq!(events[0].status, EventStatus::Rejected);
    assert_eq!(events[0].confirmed_slot, None);
    assert!(!detect(&slot(10, 0, 11, 0), &events, ConflictScope::ConfirmedOnly).has_conflict);
}

#[test]
fn confirmed_event_without_slot_is_rejected() {
    let json = r#"[{
        "id": "b", "company_id": "c1", "company_name": "Acme", "title": "x",
        "status": "confirmed",
        "candidate_slots": [
            {"start_time": "2024-02-01T13:00:00Z", "end_time": "2024-02-01T14:00:00Z"}
        ]
    }]"#;

    match events_from_json(json) {
        Err(SchedulingError::Store(message)) => assert!(message.contains("no confirmed_slot")),
        other => panic!("expected store error, got {:?}", other),
    }
}

#[test]
fn slot_on_unconfirmed_event_never_blocks() {
    let mut event = Event::new("a", "company-a", "Company A", "Interview")
        .with_confirmed_slot(ConfirmedInterval::from(slot(10, 0, 11, 0)));
    event.status = EventStatus::Rejected;

    assert!(!event.is_confirmed());
    assert!(!detect(&slot(10, 0, 11, 0), &[event], ConflictScope::ConfirmedOnly).has_conflict);
}

fn window_on(day: u32, sh: u32, sm: u32, eh: u32, em: u32) -> CandidateInterval {
    CandidateInterval::new(
        Utc.with_ymd_and_hms(2024, 2, day, sh, sm, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, day, eh, em, 0).unwrap(),
    )
    .unwrap()
}

#[test]
fn candidate_summary_shows_start_ranges_per_day() {
    let event = Event::new("b", "company-b", "Company B", "First interview").with_candidate_slots(vec![
        window_on(2, 9, 0, 9, 20),
        window_on(1, 13, 0, 15, 0),
        window_on(1, 10, 0, 10, 30),
    ]);

    assert_eq!(
        format_candidate_summary(&event, chrono_tz::UTC),
        "・2/1(Thu) 10:00、13:00〜14:30\n・2/2(Fri) 09:00〜09:20"
    );
}

#[test]
fn candidate_summary_groups_by_local_date() {
    // 14:00-16:00 UTC on 2/1 is 23:00-01:00 in Tokyo; 16:00-17:00 UTC is 2/2 01:00 there.
    let event = Event::new("b", "company-b", "Company B", "First interview").with_candidate_slots(vec![
        window_on(1, 14, 0, 16, 0),
        window_on(1, 16, 0, 17, 0),
    ]);

    assert_eq!(
        format_candidate_summary(&event, chrono_tz::Asia::Tokyo),
        "・2/1(Thu) 23:00〜00:30\n・2/2(Fri) 01:00〜01:30"
    );
}

#[test]
fn candidate_summary_of_event_without_windows_is_empty() {
    let event = Event::new("b", "company-b", "Company B", "First interview");

    assert_eq!(format_candidate_summary(&event, chrono_tz::UTC), "");
}

#[test]
fn event_for_company_takes_its_labels() {
    let company: Company = serde_json::from_str(
        r#"{"id": "company-a", "name": "Company A", "industry": "Software", "current_stage": "second_interview"}"#,
    )
    .unwrap();
    assert_eq!(company.current_stage, SelectionStage::SecondInterview);
    assert_eq!(company.position, "");

    let event = Event::for_company("e1", &company, "Second interview");

    assert_eq!(event.company_id, "company-a");
    assert_eq!(event.company_name, "Company A");
    assert_eq!(event.status, EventStatus::Candidate);
}

#[test]
fn starting_at_past_the_representable_range_is_invalid() {
    let near_end = DateTime::<Utc>::MAX_UTC - chrono::Duration::minutes(10);

    assert!(matches!(
        TimeInterval::starting_at(near_end, 30),
        Err(SchedulingError::InvalidRange { .. })
    ));
    assert!(matches!(
        TimeInterval::starting_at(at(10, 0), i64::MAX),
        Err(SchedulingError::InvalidRange { .. })
    ));
    assert!(matches!(
        TimeInterval::starting_at(at(10, 0), 0),
        Err(SchedulingError::InvalidRange { .. })
    ));
}

#[test]
fn huge_buffer_saturates() {
    let buffered = slot(10, 0, 11, 0).with_buffer(i64::MAX);

    assert_eq!(buffered.start(), DateTime::<Utc>::MIN_UTC);
    assert_eq!(buffered.end(), DateTime::<Utc>::MAX_UTC);
    assert!(buffered.overlaps(&slot(0, 0, 0, 5)));
}
