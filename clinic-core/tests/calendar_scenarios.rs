use std::fs;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use clinic_core::seed::sample_events;
use clinic_core::{
    CalendarView, EventFilter, EventPatch, EventStatus, EventStore, EventType, KeyValueStore,
    MemoryStorage, ViewMode, DEFAULT_STORAGE_KEY,
};
use serde_json::Value;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(path).expect("fixture is readable")
}

fn clinic_offset() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn ids<'a>(events: impl IntoIterator<Item = &'a clinic_core::CalendarEvent>) -> Vec<&'a str> {
    events.into_iter().map(|event| event.id.as_str()).collect()
}

#[test]
fn emergency_today_is_visible_until_filtered_by_status() {
    let store = EventStore::new(MemoryStorage::new(), sample_events(today(), clinic_offset()));
    store.initialize();
    let events = store.load();

    let mut view = CalendarView::new(today(), clinic_offset()).with_mode(ViewMode::Day);
    view.finish_loading();
    assert!(ids(view.visible_events(&events)).contains(&"3"));

    view.set_filter(EventFilter {
        statuses: vec![EventStatus::Completed],
        ..EventFilter::default()
    });
    assert!(!ids(view.visible_events(&events)).contains(&"3"));
}

#[test]
fn blob_written_by_the_web_app_is_readable() {
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, fixture("persisted_events.json"));
    let store = EventStore::new(storage, Vec::new());
    let events = store.load();

    assert_eq!(ids(&events), vec!["evt-101", "evt-102", "evt-103"]);
    assert_eq!(events[1].event_type, EventType::Emergency);
    assert!(events[2].is_broadcast());
    assert!(events[2].equipment.is_empty());

    // 23:40 at +02:00 is already the 20th at +05:00.
    let local_day = CalendarView::new(today(), clinic_offset()).with_mode(ViewMode::Day);
    assert_eq!(ids(local_day.visible_events(&events)), vec!["evt-101", "evt-102"]);
    let eastern_day = CalendarView::new(today(), FixedOffset::east_opt(5 * 3600).unwrap()).with_mode(ViewMode::Day);
    assert_eq!(ids(eastern_day.visible_events(&events)), vec!["evt-101"]);

    let doctor_week = CalendarView::new(today(), clinic_offset()).with_doctor("D002");
    assert_eq!(ids(doctor_week.visible_events(&events)), vec!["evt-102", "evt-103"]);
}

#[test]
fn rewriting_the_web_app_blob_keeps_its_shape() {
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, fixture("persisted_events.json"));
    let store = EventStore::new(storage, Vec::new());
    store.save(&store.load());

    let rewritten: Value =
        serde_json::from_str(&store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
    let persisted: Value = serde_json::from_str(&fixture("persisted_events.json")).unwrap();
    assert_eq!(rewritten, persisted);
}

#[test]
fn browser_blob_with_nulls_and_millisecond_stamps_is_rewritten_verbatim() {
    let blob = fixture("web_app_blob.json");
    let store = EventStore::new(MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, blob.clone()), Vec::new());

    store.save(&store.load());
    assert_eq!(store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap(), Some(blob.clone()));

    store.update("web-1", EventPatch::status(EventStatus::InProgress)).unwrap();
    let stored: Value =
        serde_json::from_str(&store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
    let before: Value = serde_json::from_str(&blob).unwrap();

    assert_eq!(stored[1], before[1]);
    assert_eq!(stored[1]["patientId"], Value::Null);
    assert_eq!(stored[1]["startTime"], "2026-10-19T15:00:00.000Z");
    assert_eq!(stored[0]["status"], "in-progress");
}

#[test]
fn crud_cycle_over_the_sample_calendar() {
    let clock = || -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap() };
    let store = EventStore::new(MemoryStorage::new(), sample_events(today(), clinic_offset())).with_clock(clock);
    store.initialize();

    let start = clinic_offset().with_ymd_and_hms(2026, 10, 21, 9, 0, 0).unwrap();
    let added = store
        .add(
            clinic_core::CalendarEvent::new("11", "Vascular access check", EventType::FollowUp, start, start + chrono::Duration::minutes(30))
                .with_patient("P005", "Daniel Kim")
                .with_doctor("D002", "Dr. Michael Reyes"),
        )
        .unwrap();
    assert_eq!(store.find("11"), Some(added.clone()));

    let updated = store
        .update("11", EventPatch::status(EventStatus::Rescheduled))
        .unwrap()
        .unwrap();
    assert!(updated.updated_at > added.updated_at);
    assert_eq!(updated.status, EventStatus::Rescheduled);

    assert!(store.delete("11"));
    assert!(store.find("11").is_none());
    assert_eq!(store.load().len(), 10);
}
