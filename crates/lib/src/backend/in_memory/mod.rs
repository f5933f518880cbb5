//! In-memory storage backend
//!
//! A `HashMap` guarded by a lock, with an optional byte quota and a switch that
//! makes it refuse access, so the store's degraded paths can be exercised.
//! State can be saved to and loaded from a JSON file.

mod persistence;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::Result;
use crate::backend::{BackendError, StorageBackend};

/// In-memory key/string storage.
///
/// The quota, when set, bounds the sum of key and value byte lengths across
/// all entries, which is how browsers account local storage.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    unavailable: AtomicBool,
}

impl InMemory {
    /// Creates a new, empty backend without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty backend that rejects writes beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Make every operation fail with [`BackendError::Unavailable`] (or succeed
    /// again when `available` is true).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Total bytes currently held.
    pub fn used_bytes(&self) -> usize {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Saves all entries to `path` as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads entries from `path`.
    ///
    /// If the file does not exist, a new, empty backend is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable {
                reason: "storage access is disabled".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl StorageBackend for InMemory {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(quota) = self.quota {
            let current: usize = items.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let required = current - replaced + key.len() + value.len();
            if required > quota {
                return Err(BackendError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    quota,
                }
                .into());
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_available()?;
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_available()?;
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.keys().cloned().collect())
    }
}
