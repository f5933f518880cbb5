use kobllux::{CardLayout, CardMode, constants::UI_STATE};

use crate::helpers::*;

#[test]
fn test_layout_round_trip_through_store() {
    let store = test_store();
    let layout = CardLayout {
        mode: CardMode::Orb,
        left: "40px".into(),
        top: "300px".into(),
    };
    layout.save(&store);

    let raw: serde_json::Value = serde_json::from_str(&store.get(UI_STATE, "")).unwrap();
    assert_eq!(raw["mode"], "orb");
    assert_eq!(CardLayout::load(&store), layout);
}

#[test]
fn test_hud_does_not_keep_position() {
    let store = test_store();
    store.set(UI_STATE, r#"{"mode":"hud","left":"1px","top":"2px"}"#);
    let layout = CardLayout::load(&store);
    assert_eq!(layout.mode, CardMode::Hud);
    assert_eq!(layout.left, "");
}

#[test]
fn test_missing_or_garbage_state_is_default() {
    let store = test_store();
    assert_eq!(CardLayout::load(&store), CardLayout::default());
    store.set(UI_STATE, "not json");
    assert_eq!(CardLayout::load(&store).mode, CardMode::Card);
}
