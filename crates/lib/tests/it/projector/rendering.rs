use std::sync::Arc;

use kobllux::{
    StateProjector, SurfaceKind,
    constants::{API_KEY, MODEL, SYSTEM_ROLE, USER_NAME},
    projector::MemoryFragment,
};

use crate::helpers::*;

#[test]
fn test_focus_guard_skips_only_the_focused_input() {
    let store = test_store();
    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::ChatWidget, store.clone(), fragment.clone());
    let _attached = projector.attach();

    fragment.focus("inputUserId");
    fragment.type_into("inputUserId", "Ana Lu");
    store.set(USER_NAME, "Bia");

    assert_eq!(fragment.input("inputUserId").as_deref(), Some("Ana Lu"));
    assert_eq!(fragment.text("usernameDisplay").as_deref(), Some("Bia"));

    fragment.blur();
    store.set(MODEL, "openai/gpt-4o");
    assert_eq!(fragment.input("inputUserId").as_deref(), Some("Bia"));
    assert_eq!(fragment.input("inputModel").as_deref(), Some("openai/gpt-4o"));
}

#[test]
fn test_attach_renders_defaults() {
    let store = test_store();
    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::Dashboard, store, fragment.clone());
    let _attached = projector.attach();

    assert_eq!(fragment.text("user-display").as_deref(), Some("VIAJANTE"));
    assert_eq!(fragment.text("infodose-title").as_deref(), Some("KOBLLUXOS"));
    assert_eq!(fragment.text("current-model").as_deref(), Some("auto"));
    assert_eq!(fragment.text("deck-count").as_deref(), Some("0"));
    assert_eq!(fragment.text("deck-last").as_deref(), Some("-"));
}

#[test]
fn test_surface_cannot_commit_controller_keys() {
    let store = test_store();
    let fragment = Arc::new(MemoryFragment::new());
    let projector = StateProjector::new(SurfaceKind::FloatingCard, store.clone(), fragment.clone());

    for key in [API_KEY, USER_NAME, SYSTEM_ROLE, "fusion_os_data_v2"] {
        let err = projector.commit(key, "x").unwrap_err();
        assert!(err.is_validation_error(), "{key}");
        assert_eq!(store.get_opt(key), None);
    }

    fragment.type_into("inputUser", "Ana");
    assert!(projector.commit_input("inputUser").unwrap_err().is_validation_error());
}

#[test]
fn test_card_and_chat_stay_consistent() {
    let store = test_store();
    let chat_fragment = Arc::new(MemoryFragment::new());
    let card_fragment = Arc::new(MemoryFragment::new());
    let chat = StateProjector::new(SurfaceKind::ChatWidget, store.clone(), chat_fragment.clone());
    let card = StateProjector::new(SurfaceKind::FloatingCard, store.clone(), card_fragment.clone());
    let _a = chat.attach();
    let _b = card.attach();

    store.set(API_KEY, "sk-9");
    assert_eq!(chat_fragment.input("apiKeyInput").as_deref(), Some("sk-9"));
    assert_eq!(card_fragment.input("apiKeyInputSystem").as_deref(), Some("sk-9"));
}
