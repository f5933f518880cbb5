//! Blob assets referenced from entries.
//!
//! Images, style sheets and conversation snapshots are too large for string
//! entries. They live in an [`AssetStore`], and entries only record the asset
//! id: [`BG_ACTIVE`] for the background, [`CUSTOM_CSS`] for the style sheet,
//! and [`DECK_META`](crate::constants::DECK_META) summarizes the deck.

pub mod deck;
pub mod errors;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

pub use deck::{Deck, DeckItem, DeckMessage, DeckMeta};
pub use errors::AssetError;

use crate::Result;
use crate::clock::{Clock, SystemClock};
use crate::constants::{BG_ACTIVE, CUSTOM_CSS};
use crate::store::KeyValueStore;

/// Asset id under which the custom style sheet is kept.
pub const STYLE_ASSET_ID: &str = "style_custom";

/// Keyed blob storage.
#[async_trait]
pub trait AssetStore: Send + Sync + Debug {
    /// Store `bytes` under `id`, replacing any previous blob.
    async fn put(&self, id: &str, bytes: Vec<u8>) -> Result<()>;

    /// The blob stored under `id`.
    async fn get(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Remove `id`. Removing an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Ids starting with `prefix`, in no particular order.
    async fn ids(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-memory [`AssetStore`].
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssets {
    async fn put(&self, id: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        Ok(())
    }

    async fn ids(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Background image and custom style management.
#[derive(Debug, Clone)]
pub struct AssetManager {
    store: KeyValueStore,
    assets: Arc<dyn AssetStore>,
    clock: Arc<dyn Clock>,
}

impl AssetManager {
    pub fn new(store: KeyValueStore, assets: Arc<dyn AssetStore>) -> Self {
        Self::with_clock(store, assets, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: KeyValueStore,
        assets: Arc<dyn AssetStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            assets,
            clock,
        }
    }

    /// Store a background image and make it the active one.
    ///
    /// Images above the configured size limit are rejected with
    /// [`AssetError::QuotaExceeded`] before anything is written.
    pub async fn upload_background(&self, name: &str, bytes: Vec<u8>) -> Result<String> {
        let limit = self.store.config().asset_size_limit;
        if bytes.len() > limit {
            tracing::warn!(name, size = bytes.len(), limit, "background rejected");
            return Err(AssetError::QuotaExceeded {
                size: bytes.len(),
                limit,
            }
            .into());
        }

        let id = format!("bg_{}", self.clock.now_millis());
        self.assets.put(&id, bytes).await?;
        self.store.set(BG_ACTIVE, id.clone());
        tracing::debug!(name, %id, "background uploaded");
        Ok(id)
    }

    /// Reference of the active background, if one is set.
    pub fn active_background(&self) -> Option<String> {
        self.store.get_opt(BG_ACTIVE).filter(|id| !id.is_empty())
    }

    /// Bytes of the active background.
    pub async fn background_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.active_background() {
            Some(id) => self.assets.get(&id).await,
            None => Ok(None),
        }
    }

    /// Clear the background reference. The blob itself is kept.
    pub fn clear_background(&self) {
        self.store.set(BG_ACTIVE, "");
    }

    /// Save the custom style sheet and point the style entry at it.
    pub async fn save_custom_style(&self, css: &str) -> Result<()> {
        self.assets
            .put(STYLE_ASSET_ID, css.as_bytes().to_vec())
            .await?;
        self.store.set(CUSTOM_CSS, STYLE_ASSET_ID);
        Ok(())
    }

    /// The custom style sheet, if one is set.
    pub async fn custom_style(&self) -> Result<Option<String>> {
        let Some(id) = self.store.get_opt(CUSTOM_CSS).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let bytes = self.assets.get(&id).await?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    /// Remove the custom style sheet.
    pub async fn clear_custom_style(&self) -> Result<()> {
        self.assets.delete(STYLE_ASSET_ID).await?;
        self.store.set(CUSTOM_CSS, "");
        Ok(())
    }
}
