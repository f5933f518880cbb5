//! Multi-surface reconciliation.
//!
//! A [`StateProjector`] keeps one surface's [`Fragment`] in line with the
//! canonical store. It never caches entries: every notification, from the
//! same document or from another context, triggers a fresh [`Snapshot`] read
//! and a re-render. Inputs with focus are skipped, so a sync never clobbers
//! an edit in progress.
//!
//! Surfaces write back only through [`StateProjector::commit`], and only to
//! shared keys. Identity and credential entries belong to the
//! [`MasterController`](crate::MasterController).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kobllux::{StorageArea, backend::InMemory};
//! use kobllux::projector::{MemoryFragment, StateProjector, SurfaceKind};
//!
//! let store = StorageArea::new(InMemory::new()).open_context();
//! let fragment = Arc::new(MemoryFragment::new());
//! let projector = StateProjector::new(SurfaceKind::Dashboard, store.clone(), fragment.clone());
//! let _attached = projector.attach();
//!
//! store.set("di_modelName", "openai/gpt-4o");
//! assert_eq!(fragment.text("current-model").as_deref(), Some("gpt-4o"));
//! ```

pub mod errors;
mod fragment;
mod surface;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;

pub use errors::ProjectorError;
pub use fragment::{Fragment, MemoryFragment};
pub use surface::{Snapshot, SurfaceKind};

use crate::Result;
use crate::bus::Subscription;
use crate::constants::{KeyOwner, SOLAR_MODE, owner};
use crate::store::KeyValueStore;
use crate::theme::SolarMode;

#[derive(Debug)]
struct ProjectorInner {
    kind: SurfaceKind,
    store: KeyValueStore,
    fragment: Arc<dyn Fragment>,
    renders: AtomicU64,
}

/// Projects canonical state onto one surface.
#[derive(Debug, Clone)]
pub struct StateProjector {
    inner: Arc<ProjectorInner>,
}

impl StateProjector {
    pub fn new(kind: SurfaceKind, store: KeyValueStore, fragment: Arc<dyn Fragment>) -> Self {
        Self {
            inner: Arc::new(ProjectorInner {
                kind,
                store,
                fragment,
                renders: AtomicU64::new(0),
            }),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.inner.kind
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.inner.store
    }

    /// Re-read the store and redraw the fragment.
    pub fn render(&self) -> Snapshot {
        let snapshot = Snapshot::read(&self.inner.store);
        self.inner.kind.render(&snapshot, self.inner.fragment.as_ref());
        self.inner.renders.fetch_add(1, Ordering::Relaxed);
        snapshot
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.load(Ordering::Relaxed)
    }

    /// React to a change of `key`.
    ///
    /// Keys this surface does not display are ignored. The chat surface also
    /// applies a new theme mode, without writing it back.
    pub fn on_change(&self, key: &str) {
        if !self.inner.kind.watches(key) {
            return;
        }
        let snapshot = self.render();
        if key == SOLAR_MODE && self.inner.kind == SurfaceKind::ChatWidget {
            self.inner
                .fragment
                .apply_theme(SolarMode::parse(&snapshot.solar_mode));
        }
    }

    /// Write a user edit to a shared entry.
    ///
    /// Controller-owned keys are rejected before anything is written.
    pub fn commit(&self, key: &str, value: &str) -> Result<()> {
        if owner(key) == KeyOwner::Controller {
            return Err(ProjectorError::ReadOnlyKey {
                key: key.to_string(),
            }
            .into());
        }
        self.inner.store.set(key, value);
        Ok(())
    }

    /// Commit the current value of input `element` to its bound entry.
    pub fn commit_input(&self, element: &str) -> Result<()> {
        let key = self
            .inner
            .kind
            .binding(element)
            .ok_or_else(|| ProjectorError::UnknownElement {
                element: element.to_string(),
                surface: self.inner.kind.name(),
            })?;
        let value = self.inner.fragment.input_value(element).unwrap_or_default();
        self.commit(key, &value)
    }

    /// Render now and follow same-document changes until the returned
    /// handle is dropped.
    pub fn attach(&self) -> AttachedProjector {
        let snapshot = self.render();
        if self.inner.kind == SurfaceKind::ChatWidget {
            self.inner
                .fragment
                .apply_theme(SolarMode::parse(&snapshot.solar_mode));
        }

        let weak = Arc::downgrade(&self.inner);
        let subscription = self.inner.store.subscribe(move |event| {
            if let Some(projector) = upgrade(&weak) {
                projector.on_change(&event.key);
            }
        });
        tracing::debug!(surface = %self.inner.kind, "projector attached");

        AttachedProjector {
            projector: self.clone(),
            _subscription: subscription,
            task: None,
        }
    }

    /// Like [`attach`](Self::attach), and also follow writes from other
    /// contexts on the same storage area.
    ///
    /// Cross-context delivery runs on a Tokio task; outside a runtime only
    /// same-document changes are followed.
    pub fn attach_with_storage_events(&self) -> AttachedProjector {
        let mut attached = self.attach();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(surface = %self.inner.kind, "no runtime; cross-context events disabled");
            return attached;
        };

        let mut events = self.inner.store.storage_events();
        let weak = Arc::downgrade(&self.inner);
        attached.task = Some(runtime.spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(projector) = upgrade(&weak) else {
                    break;
                };
                tracing::trace!(key = %event.key, origin = %event.origin, "storage event");
                projector.on_change(&event.key);
            }
        }));
        attached
    }
}

fn upgrade(weak: &Weak<ProjectorInner>) -> Option<StateProjector> {
    weak.upgrade().map(|inner| StateProjector { inner })
}

/// A projector that follows the store. Dropping it stops all delivery.
#[derive(Debug)]
#[must_use = "dropping an AttachedProjector detaches it"]
pub struct AttachedProjector {
    projector: StateProjector,
    _subscription: Subscription,
    task: Option<JoinHandle<()>>,
}

impl AttachedProjector {
    pub fn projector(&self) -> &StateProjector {
        &self.projector
    }

    /// Whether cross-context events are followed.
    pub fn follows_storage_events(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AttachedProjector {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
