//! The canonical key/value store.
//!
//! A [`StorageArea`] is the storage shared by every browsing context in a
//! group: one [`StorageBackend`] plus the cross-context broadcast channel.
//! Each context opens its own [`KeyValueStore`] on the area, which owns that
//! context's same-document [`ChangeBus`].
//!
//! # Durability policy
//!
//! The store never fails a read or write. Backend errors are logged; reads
//! fall back, and a write that could not be persisted is kept in a volatile
//! per-context overlay so the context keeps seeing its own value. The
//! same-document [`ChangeEvent`] fires regardless. Other contexts are only
//! told about writes that actually reached the backend, and once such a
//! write lands on a key, any older overlay value for that key is dropped.
//!
//! # Example
//!
//! ```
//! use kobllux::{StorageArea, backend::InMemory};
//!
//! let area = StorageArea::new(InMemory::new());
//! let store = area.open_context();
//!
//! store.set("di_modelName", "openai/gpt-4o");
//! assert_eq!(store.get("di_modelName", "auto"), "openai/gpt-4o");
//! assert!(store.get_bool("di_solarAuto", true));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use handle_trait::Handle;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::broadcast;

use crate::backend::StorageBackend;
use crate::bus::{ChangeBus, ChangeEvent, ContextId, StorageEvent, StorageEvents, Subscription};
use crate::config::SyncConfig;
use crate::constants::{FALSE, SEEDED_DEFAULTS, TRUE};

#[derive(Debug)]
struct AreaInner {
    backend: Arc<dyn StorageBackend>,
    events: broadcast::Sender<StorageEvent>,
    config: SyncConfig,
    /// Count of persisted writes per key, across all contexts.
    revisions: Mutex<HashMap<String, u64>>,
}

/// Storage shared by all contexts of a group.
#[derive(Clone, Debug, Handle)]
pub struct StorageArea {
    inner: Arc<AreaInner>,
}

impl StorageArea {
    /// Wrap `backend` with the default configuration.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_config(backend, SyncConfig::default())
    }

    /// Wrap `backend` with an explicit configuration.
    pub fn with_config(backend: impl StorageBackend + 'static, config: SyncConfig) -> Self {
        Self::from_shared(Arc::new(backend), config)
    }

    /// Wrap an already shared backend.
    pub fn from_shared(backend: Arc<dyn StorageBackend>, config: SyncConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(AreaInner {
                backend,
                events,
                config,
                revisions: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open a new browsing context on this area.
    pub fn open_context(&self) -> KeyValueStore {
        let context = ContextId::new();
        tracing::debug!(%context, "opened storage context");
        KeyValueStore {
            inner: Arc::new(StoreInner {
                area: self.handle(),
                context,
                bus: ChangeBus::new(),
                volatile: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The shared backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.inner.backend
    }

    /// The area configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    fn revision(&self, key: &str) -> u64 {
        self.revisions().get(key).copied().unwrap_or(0)
    }

    fn bump_revision(&self, key: &str) {
        *self.revisions().entry(key.to_string()).or_insert(0) += 1;
    }

    fn revisions(&self) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
        self.inner
            .revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A value whose write failed, with the key's revision at that moment.
#[derive(Debug, Clone)]
struct Unpersisted {
    value: String,
    revision: u64,
}

#[derive(Debug)]
struct StoreInner {
    area: StorageArea,
    context: ContextId,
    bus: ChangeBus,
    /// Values whose last write failed to persist, visible to this context only.
    volatile: Mutex<HashMap<String, Unpersisted>>,
}

/// One context's view of the canonical key/value store.
///
/// Cheap to clone; every clone shares the same context and bus.
#[derive(Clone, Debug, Handle)]
pub struct KeyValueStore {
    inner: Arc<StoreInner>,
}

impl KeyValueStore {
    /// Returns the stored string for `key`, or `fallback` if absent.
    pub fn get(&self, key: &str, fallback: &str) -> String {
        self.read_raw(key).unwrap_or_else(|| fallback.to_string())
    }

    /// Returns the stored string for `key`, or `None` if absent.
    pub fn get_opt(&self, key: &str) -> Option<String> {
        self.read_raw(key)
    }

    /// Persist `value` under `key` and emit exactly one [`ChangeEvent`].
    ///
    /// The event fires even if the value is unchanged, and even if the
    /// backend rejected the write.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let old_value = self.read_raw(key);

        let persisted = match self.inner.area.backend().set_item(key, &value) {
            Ok(()) => {
                self.volatile().remove(key);
                self.inner.area.bump_revision(key);
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "storage write failed; keeping value in memory");
                self.hold_unpersisted(key, &value);
                false
            }
        };

        self.inner.bus.emit(&ChangeEvent {
            key: key.to_string(),
            value: value.clone(),
        });

        if persisted {
            self.broadcast(key, Some(value), old_value);
        }
    }

    /// Serialize `value` as JSON and [`set`](Self::set) it.
    ///
    /// A value that cannot be serialized is logged and not written.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, json),
            Err(e) => tracing::error!(key, error = %e, "failed to serialize entry"),
        }
    }

    /// Parse the JSON stored under `key`.
    ///
    /// Absent keys and unparseable values both yield `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unparseable entry");
                None
            }
        }
    }

    /// True iff the stored value is exactly `"true"`; `fallback` if absent.
    pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
        match self.read_raw(key) {
            Some(value) => value == TRUE,
            None => fallback,
        }
    }

    /// Equivalent to `set(key, "true" | "false")`.
    pub fn set_bool(&self, key: &str, value: bool) {
        self.set(key, if value { TRUE } else { FALSE });
    }

    /// Delete `key`, emitting a [`ChangeEvent`] with an empty value.
    pub fn remove(&self, key: &str) {
        let old_value = self.read_raw(key);
        self.volatile().remove(key);

        let persisted = match self.inner.area.backend().remove_item(key) {
            Ok(()) => {
                self.inner.area.bump_revision(key);
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "storage remove failed");
                false
            }
        };

        self.inner.bus.emit(&ChangeEvent {
            key: key.to_string(),
            value: String::new(),
        });

        if persisted {
            self.broadcast(key, None, old_value);
        }
    }

    /// Write the startup defaults for every key that is still absent.
    ///
    /// Seeding is silent: no events are emitted.
    pub fn seed_defaults(&self) {
        for (key, value) in SEEDED_DEFAULTS {
            if self.read_raw(key).is_some() {
                continue;
            }
            match self.inner.area.backend().set_item(key, value) {
                Ok(()) => self.inner.area.bump_revision(key),
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to seed default");
                    self.hold_unpersisted(key, value);
                }
            }
        }
    }

    /// Register a same-document listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(listener)
    }

    /// Receive writes made by other contexts on the same area.
    pub fn storage_events(&self) -> StorageEvents {
        StorageEvents::new(
            self.inner.area.inner.events.subscribe(),
            self.inner.context,
            self.inner.area.config().namespace.clone(),
        )
    }

    /// This context's same-document bus.
    pub fn bus(&self) -> &ChangeBus {
        &self.inner.bus
    }

    /// The area this context was opened on.
    pub fn area(&self) -> &StorageArea {
        &self.inner.area
    }

    /// The area configuration.
    pub fn config(&self) -> &SyncConfig {
        self.inner.area.config()
    }

    /// Identifier of this context.
    pub fn context_id(&self) -> ContextId {
        self.inner.context
    }

    /// Whether some write from this context is only held in memory.
    ///
    /// Values superseded by a later persisted write from any context do not
    /// count.
    pub fn has_unpersisted(&self) -> bool {
        self.volatile()
            .iter()
            .any(|(key, held)| held.revision == self.inner.area.revision(key))
    }

    fn hold_unpersisted(&self, key: &str, value: &str) {
        let revision = self.inner.area.revision(key);
        self.volatile().insert(
            key.to_string(),
            Unpersisted {
                value: value.to_string(),
                revision,
            },
        );
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        let revision = self.inner.area.revision(key);
        {
            let mut volatile = self.volatile();
            let superseded = match volatile.get(key) {
                Some(held) if held.revision == revision => return Some(held.value.clone()),
                Some(_) => true,
                None => false,
            };
            if superseded {
                volatile.remove(key);
                tracing::debug!(key, "unpersisted value superseded by a newer write");
            }
        }
        match self.inner.area.backend().get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed; serving fallback");
                None
            }
        }
    }

    fn broadcast(&self, key: &str, new_value: Option<String>, old_value: Option<String>) {
        // No receivers is not an error: nobody else is listening yet.
        let _ = self.inner.area.inner.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            old_value,
            origin: self.inner.context,
        });
    }

    fn volatile(&self) -> std::sync::MutexGuard<'_, HashMap<String, Unpersisted>> {
        self.inner
            .volatile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
