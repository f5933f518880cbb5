//! Runtime configuration for a storage area.

use serde::{Deserialize, Serialize};

use crate::constants::NAMESPACE;
use crate::vault::KdfParams;

/// Largest background image accepted by the asset layer, in bytes.
pub const DEFAULT_ASSET_SIZE_LIMIT: usize = 2_500_000;

/// Buffered cross-context events per receiver before it starts lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration shared by every context opened on a [`StorageArea`](crate::StorageArea).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Only keys with this prefix are delivered to cross-context listeners.
    pub namespace: String,
    /// Size ceiling for uploaded background images.
    pub asset_size_limit: usize,
    /// Capacity of the cross-context broadcast channel.
    pub event_capacity: usize,
    /// Key derivation cost used when the vault encrypts.
    pub kdf: KdfParams,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            asset_size_limit: DEFAULT_ASSET_SIZE_LIMIT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            kdf: KdfParams::default(),
        }
    }
}

impl SyncConfig {
    /// Replace the key derivation parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Replace the asset size ceiling.
    pub fn with_asset_size_limit(mut self, limit: usize) -> Self {
        self.asset_size_limit = limit;
        self
    }

    /// Whether `key` is in the namespace projected across contexts.
    pub fn in_namespace(&self, key: &str) -> bool {
        key.starts_with(&self.namespace)
    }
}
