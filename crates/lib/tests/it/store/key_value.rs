use std::sync::Arc;

use kobllux::{
    StorageArea,
    backend::InMemory,
    constants::{API_KEY, MODEL, SOLAR_AUTO, SOLAR_MODE, USER_NAME},
};
use serde::{Deserialize, Serialize};

use crate::helpers::*;

#[test]
fn test_set_then_get_round_trip() {
    let store = test_store();
    store.set(MODEL, "openai/gpt-4o");
    assert_eq!(store.get(MODEL, "auto"), "openai/gpt-4o");

    store.set(MODEL, "");
    assert_eq!(store.get(MODEL, "auto"), "");
    assert_eq!(store.get_opt(MODEL).as_deref(), Some(""));
}

#[test]
fn test_get_falls_back_when_absent() {
    let store = test_store();
    assert_eq!(store.get(USER_NAME, "Viajante"), "Viajante");
    assert_eq!(store.get_opt(USER_NAME), None);
}

#[test]
fn test_get_bool_requires_literal_true() {
    let store = test_store();
    assert!(store.get_bool(SOLAR_AUTO, true));
    assert!(!store.get_bool(SOLAR_AUTO, false));

    for (stored, expected) in [
        ("true", true),
        ("false", false),
        ("TRUE", false),
        ("1", false),
        ("", false),
    ] {
        store.set(SOLAR_AUTO, stored);
        assert_eq!(store.get_bool(SOLAR_AUTO, true), expected, "stored {stored:?}");
    }

    store.set_bool(SOLAR_AUTO, true);
    assert_eq!(store.get(SOLAR_AUTO, ""), "true");
}

#[test]
fn test_every_set_emits_exactly_one_event() {
    let store = test_store();
    let recorder = Recorder::attach(&store);

    store.set(SOLAR_MODE, "day");
    store.set(SOLAR_MODE, "day");
    store.set(MODEL, "x/y");

    assert_eq!(recorder.count_for(SOLAR_MODE), 2);
    assert_eq!(recorder.count_for(MODEL), 1);
    let events = recorder.events.lock().unwrap();
    assert_eq!(events[0].value, "day");
}

#[test]
fn test_listener_reads_new_value() {
    let store = test_store();
    let seen = Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();
    let reader = store.clone();
    let _sub = store.subscribe(move |event| {
        *sink.lock().unwrap() = Some(reader.get(&event.key, ""));
    });

    store.set(USER_NAME, "Ana");
    assert_eq!(seen.lock().unwrap().as_deref(), Some("Ana"));
}

#[test]
fn test_remove_emits_empty_value() {
    let store = test_store();
    store.set(API_KEY, "sk-1");
    let recorder = Recorder::attach(&store);

    store.remove(API_KEY);
    assert_eq!(store.get_opt(API_KEY), None);
    let events = recorder.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value, "");
}

#[test]
fn test_failed_write_still_emits_and_is_readable() {
    let backend = Arc::new(InMemory::new());
    let area = StorageArea::from_shared(backend.clone(), test_config());
    let store = area.open_context();
    let recorder = Recorder::attach(&store);

    backend.set_available(false);
    store.set(USER_NAME, "Ana");

    assert_eq!(recorder.count_for(USER_NAME), 1);
    assert_eq!(store.get(USER_NAME, "Viajante"), "Ana");
    assert!(store.has_unpersisted());

    backend.set_available(true);
    let other = area.open_context();
    assert_eq!(other.get_opt(USER_NAME), None);

    store.set(USER_NAME, "Bia");
    assert!(!store.has_unpersisted());
    assert_eq!(other.get_opt(USER_NAME).as_deref(), Some("Bia"));
}

#[test]
fn test_later_write_from_another_context_replaces_unpersisted_value() {
    let backend = Arc::new(InMemory::new());
    let area = StorageArea::from_shared(backend.clone(), test_config());
    let a = area.open_context();
    let b = area.open_context();

    backend.set_available(false);
    a.set(MODEL, "a/stale");
    assert_eq!(a.get(MODEL, ""), "a/stale");
    assert!(a.has_unpersisted());

    backend.set_available(true);
    b.set(MODEL, "b/new");

    assert!(!a.has_unpersisted());
    assert_eq!(a.get(MODEL, ""), "b/new");
    assert_eq!(b.get(MODEL, ""), "b/new");

    // Only the superseded key is dropped.
    backend.set_available(false);
    a.set(USER_NAME, "Ana");
    backend.set_available(true);
    b.set(MODEL, "b/newer");
    assert_eq!(a.get(USER_NAME, ""), "Ana");
    assert!(a.has_unpersisted());
}

#[test]
fn test_quota_exceeded_write_is_kept_in_memory() {
    let area = StorageArea::with_config(InMemory::with_quota(32), test_config());
    let store = area.open_context();
    let recorder = Recorder::attach(&store);

    store.set(MODEL, "a".repeat(64));
    assert_eq!(recorder.count_for(MODEL), 1);
    assert_eq!(store.get(MODEL, "").len(), 64);
    assert_eq!(area.open_context().get_opt(MODEL), None);
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Position {
    left: String,
    top: String,
}

#[test]
fn test_json_helpers() {
    let store = test_store();
    let pos = Position {
        left: "10px".into(),
        top: "20px".into(),
    };
    store.set_json("fusion_os_ui_state", &pos);
    assert_eq!(store.get_json::<Position>("fusion_os_ui_state"), Some(pos));

    store.set("fusion_os_ui_state", "{not json");
    assert_eq!(store.get_json::<Position>("fusion_os_ui_state"), None);
}

#[test]
fn test_seed_defaults_is_silent_and_keeps_existing() {
    let store = test_store();
    store.set(USER_NAME, "Ana");
    let recorder = Recorder::attach(&store);

    store.seed_defaults();
    assert!(recorder.keys().is_empty());
    assert_eq!(store.get(USER_NAME, ""), "Ana");
    assert_eq!(store.get(SOLAR_MODE, ""), "night");
    assert_eq!(store.get(SOLAR_AUTO, ""), "true");
}

#[test]
fn test_dropping_subscription_stops_delivery() {
    let store = test_store();
    let recorder = Recorder::attach(&store);
    store.set(MODEL, "a/b");
    assert_eq!(store.bus().subscriber_count(), 1);

    drop(recorder);
    assert_eq!(store.bus().subscriber_count(), 0);
    store.set(MODEL, "c/d");
}

#[test]
fn test_explicit_unsubscribe() {
    let store = test_store();
    let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();
    let sub = store.subscribe(move |_| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });
    store.set(MODEL, "a/b");
    sub.unsubscribe();
    store.set(MODEL, "c/d");
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
}
