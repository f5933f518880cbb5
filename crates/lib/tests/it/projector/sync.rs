use std::sync::Arc;
use std::time::Duration;

use kobllux::{
    SolarMode, StateProjector, StorageArea, SurfaceKind,
    backend::InMemory,
    constants::{SOLAR_MODE, USER_NAME},
    projector::MemoryFragment,
};

use crate::helpers::*;

async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_other_context_writes_are_projected() {
    let area = test_area();
    let card_context = area.open_context();
    let chat_context = area.open_context();

    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::ChatWidget, chat_context, fragment.clone());
    let attached = projector.attach_with_storage_events();
    assert!(attached.follows_storage_events());

    card_context.set(USER_NAME, "Ana");
    card_context.set(SOLAR_MODE, "day");

    assert!(wait_for(|| fragment.text("usernameDisplay").as_deref() == Some("Ana")).await);
    assert!(wait_for(|| fragment.theme() == Some(SolarMode::Day)).await);
}

#[tokio::test]
async fn test_detached_projector_stops_following() {
    let area = test_area();
    let writer = area.open_context();
    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::FloatingCard, area.open_context(), fragment.clone());

    let attached = projector.attach_with_storage_events();
    writer.set(USER_NAME, "Ana");
    assert!(wait_for(|| fragment.text("lblName").as_deref() == Some("Ana")).await);

    drop(attached);
    let renders = projector.render_count();
    writer.set(USER_NAME, "Bia");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(projector.render_count(), renders);
    assert_eq!(fragment.text("lblName").as_deref(), Some("Ana"));
}

#[test]
fn test_without_runtime_only_same_document_changes_are_followed() {
    let area = test_area();
    let store = area.open_context();
    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::FloatingCard, store.clone(), fragment.clone());

    let attached = projector.attach_with_storage_events();
    assert!(!attached.follows_storage_events());
    store.set(USER_NAME, "Ana");
    assert_eq!(fragment.text("lblName").as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_newer_write_elsewhere_replaces_unpersisted_local_value() {
    let backend = Arc::new(InMemory::new());
    let area = StorageArea::from_shared(backend.clone(), test_config());
    let card_context = area.open_context();
    let chat_context = area.open_context();

    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::ChatWidget, chat_context.clone(), fragment.clone());
    let _attached = projector.attach_with_storage_events();

    backend.set_available(false);
    chat_context.set(USER_NAME, "Local");
    assert_eq!(fragment.text("usernameDisplay").as_deref(), Some("Local"));

    backend.set_available(true);
    card_context.set(USER_NAME, "Remote");

    assert!(wait_for(|| fragment.text("usernameDisplay").as_deref() == Some("Remote")).await);
    assert_eq!(chat_context.get(USER_NAME, ""), "Remote");
}
