use std::sync::{Arc, Mutex};

use kobllux::{
    ChangeEvent, FixedClock, KdfParams, KeyValueStore, MasterController, StorageArea,
    Subscription, SyncConfig, backend::InMemory,
};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Argon2 parameters cheap enough for tests.
pub const TEST_KDF: KdfParams = KdfParams::new(64, 1, 1);

/// Default configuration with a cheap key derivation.
pub fn test_config() -> SyncConfig {
    SyncConfig::default().with_kdf(TEST_KDF)
}

/// A fresh storage area over an empty in-memory backend.
pub fn test_area() -> StorageArea {
    StorageArea::with_config(InMemory::new(), test_config())
}

/// One context on a fresh storage area.
pub fn test_store() -> KeyValueStore {
    test_area().open_context()
}

/// A controller on `store` with a frozen clock.
pub fn test_controller(store: &KeyValueStore) -> MasterController {
    MasterController::with_clock(store.clone(), Arc::new(FixedClock::new(1_704_067_200_000)))
}

/// Records every change event seen on a store.
pub struct Recorder {
    pub events: Arc<Mutex<Vec<ChangeEvent>>>,
    _subscription: Subscription,
}

impl Recorder {
    pub fn attach(store: &KeyValueStore) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let subscription = store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        Self {
            events,
            _subscription: subscription,
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn count_for(&self, key: &str) -> usize {
        self.keys().iter().filter(|k| *k == key).count()
    }
}
