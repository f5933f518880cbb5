//! Cross-context storage events.

use std::fmt;

use tokio::sync::broadcast;
use uuid::Uuid;

/// Identifies one browsing context (one document / tab) on a storage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A write observed from another context sharing the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that was written.
    pub key: String,
    /// The new value, `None` when the key was removed.
    pub new_value: Option<String>,
    /// The value before the write, if any.
    pub old_value: Option<String>,
    /// The context that performed the write.
    pub origin: ContextId,
}

/// Receiver for [`StorageEvent`]s written by other contexts.
///
/// Events from the receiving context itself and keys outside the namespace
/// are filtered out.
pub struct StorageEvents {
    rx: broadcast::Receiver<StorageEvent>,
    context: ContextId,
    namespace: String,
}

impl StorageEvents {
    pub(crate) fn new(
        rx: broadcast::Receiver<StorageEvent>,
        context: ContextId,
        namespace: String,
    ) -> Self {
        Self {
            rx,
            context,
            namespace,
        }
    }

    /// Wait for the next relevant event.
    ///
    /// Returns `None` once the storage area is gone. A receiver that falls
    /// behind skips the missed events; since consumers re-read the store,
    /// only the notification is lost, never the state.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(context = %self.context, skipped, "storage event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Return the next relevant event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(context = %self.context, skipped, "storage event receiver lagged");
                }
                Err(_) => return None,
            }
        }
    }

    fn accepts(&self, event: &StorageEvent) -> bool {
        event.origin != self.context && event.key.starts_with(&self.namespace)
    }
}

impl fmt::Debug for StorageEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEvents")
            .field("context", &self.context)
            .field("namespace", &self.namespace)
            .finish()
    }
}
