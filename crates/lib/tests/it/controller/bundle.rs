use kobllux::{
    Error, MasterController, VaultState,
    constants::{API_KEY, CREDENTIAL_BUNDLE, SYSTEM_ROLE, USER_NAME},
};

use crate::helpers::*;

#[tokio::test]
async fn test_plain_bundle_round_trip() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("A", "tok1").unwrap();
    controller.set_display_name("Ana").unwrap();
    controller.persist().await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&store.get(CREDENTIAL_BUNDLE, "")).unwrap();
    assert_eq!(raw["isEncrypted"], false);
    assert_eq!(raw["data"]["user"], "Ana");
    assert_eq!(raw["data"]["keys"][0]["token"], "tok1");

    let other = store.area().open_context();
    let mut reloaded = test_controller(&other);
    assert_eq!(reloaded.hydrate().unwrap(), VaultState::Unset);
    assert_eq!(reloaded.credentials().len(), 1);
    assert_eq!(reloaded.display_name(), "Ana");
}

#[tokio::test]
async fn test_lock_then_unlock_through_storage() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("A", "tok1").unwrap();
    controller.set_display_name("Ana").unwrap();
    controller.lock("senha").await.unwrap();

    assert_eq!(controller.vault_state(), VaultState::Locked);
    assert!(controller.credentials().is_empty());

    let raw = store.get(CREDENTIAL_BUNDLE, "");
    let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope["isEncrypted"], true);
    assert!(envelope["data"].is_string());
    assert!(!raw.contains("tok1"));

    // A fresh load of the same storage.
    let mut reloaded = test_controller(&store);
    assert_eq!(reloaded.hydrate().unwrap(), VaultState::Locked);
    assert!(reloaded.credentials().is_empty());

    store.set(API_KEY, "");
    let recorder = Recorder::attach(&store);
    let err = reloaded.unlock("errada").await.unwrap_err();
    assert!(err.is_decryption_error());
    assert_eq!(err.to_string(), "incorrect passphrase or corrupted data");
    assert_eq!(reloaded.vault_state(), VaultState::Locked);
    assert!(recorder.keys().is_empty());

    reloaded.unlock("senha").await.unwrap();
    assert_eq!(reloaded.vault_state(), VaultState::Unlocked);
    assert_eq!(reloaded.credentials().len(), 1);
    assert_eq!(store.get(API_KEY, ""), "tok1");
    assert_eq!(store.get(USER_NAME, ""), "Ana");
}

#[tokio::test]
async fn test_unlocked_persist_stays_encrypted() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("A", "tok1").unwrap();
    controller.lock("senha").await.unwrap();
    controller.hydrate().unwrap();
    controller.unlock("senha").await.unwrap();

    controller.add_credential("B", "tok2").unwrap();
    controller.persist().await.unwrap();

    let mut reloaded = test_controller(&store);
    reloaded.hydrate().unwrap();
    reloaded.unlock("senha").await.unwrap();
    assert_eq!(reloaded.credentials().len(), 2);
}

#[tokio::test]
async fn test_relock_after_persist_reopens_latest_list() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("work", "tok1").unwrap();
    controller.lock("senha").await.unwrap();
    controller.unlock("senha").await.unwrap();

    controller.add_credential("home", "tok2").unwrap();
    controller.persist().await.unwrap();

    controller.relock().unwrap();
    assert!(controller.credentials().is_empty());
    controller.unlock("senha").await.unwrap();
    let names: Vec<_> = controller.credentials().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["work", "home"]);

    // The in-memory copy and storage agree.
    let mut reloaded = test_controller(&store);
    reloaded.hydrate().unwrap();
    reloaded.unlock("senha").await.unwrap();
    assert_eq!(reloaded.credentials(), controller.credentials());
}

#[tokio::test]
async fn test_locked_controller_refuses_mutation() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("A", "tok1").unwrap();
    controller.lock("senha").await.unwrap();
    let before = store.get(CREDENTIAL_BUNDLE, "");

    assert!(controller.add_credential("B", "x").unwrap_err().is_validation_error());
    assert!(controller.persist().await.unwrap_err().is_validation_error());
    assert_eq!(store.get(CREDENTIAL_BUNDLE, ""), before);
}

#[tokio::test]
async fn test_change_passphrase_and_relock() {
    let store = test_store();
    let mut controller = test_controller(&store);
    controller.add_credential("A", "tok1").unwrap();
    controller.lock("old").await.unwrap();
    controller.hydrate().unwrap();
    controller.unlock("old").await.unwrap();

    controller.lock("new").await.unwrap();
    controller.hydrate().unwrap();
    assert!(controller.unlock("old").await.is_err());
    controller.unlock("new").await.unwrap();

    controller.relock().unwrap();
    assert_eq!(controller.vault_state(), VaultState::Locked);
    assert!(controller.credentials().is_empty());
    controller.unlock("new").await.unwrap();
    assert_eq!(controller.credentials().len(), 1);
}

#[test]
fn test_hydrate_without_bundle_keeps_defaults() {
    let store = test_store();
    store.set(SYSTEM_ROLE, "Poeta");
    let mut controller = MasterController::new(store.clone());
    assert_eq!(controller.hydrate().unwrap(), VaultState::Unset);
    assert_eq!(controller.display_name(), "Convidado");
    assert_eq!(controller.system_role(), "Poeta");
}

#[test]
fn test_corrupt_envelope_is_reported() {
    let store = test_store();
    store.set(CREDENTIAL_BUNDLE, "{broken");
    let mut controller = test_controller(&store);
    let err = controller.hydrate().unwrap_err();
    assert_eq!(err.module(), "controller");
    assert!(matches!(err, Error::Controller(ref e) if e.is_corrupt()));
}

#[test]
fn test_malformed_encrypted_bundle_is_a_decryption_failure() {
    let store = test_store();
    store.set(CREDENTIAL_BUNDLE, r#"{"isEncrypted":true,"data":"{\"s\":1}"}"#);
    let mut controller = test_controller(&store);
    assert!(controller.hydrate().unwrap_err().is_decryption_error());
}
