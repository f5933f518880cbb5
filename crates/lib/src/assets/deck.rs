//! Saved conversation snapshots.
//!
//! Each snapshot is a JSON asset under `deck_<id>`. After every save or
//! delete the deck summary is written to [`DECK_META`] so the dashboard can
//! show it without reading the assets.

use std::sync::Arc;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::{AssetError, AssetStore};
use crate::Result;
use crate::clock::{Clock, SystemClock};
use crate::constants::DECK_META;
use crate::store::KeyValueStore;

const DECK_PREFIX: &str = "deck_";
const TITLE_CHARS: usize = 30;
const UNTITLED: &str = "Memória Sem Nome";

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMessage {
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl DeckMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A saved conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckItem {
    /// Save time in milliseconds, also the sort key
    pub id: u64,
    /// Human-readable local save time
    pub date: String,
    pub title: String,
    pub data: Vec<DeckMessage>,
}

/// Summary of the deck stored under [`DECK_META`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckMeta {
    pub count: usize,
    #[serde(rename = "lastTitle")]
    pub last_title: String,
    #[serde(rename = "lastDate")]
    pub last_date: String,
}

impl Default for DeckMeta {
    /// What the dashboard shows before any summary was written.
    fn default() -> Self {
        Self {
            count: 0,
            last_title: "-".to_string(),
            last_date: String::new(),
        }
    }
}

/// Conversation snapshot storage.
#[derive(Debug, Clone)]
pub struct Deck {
    store: KeyValueStore,
    assets: Arc<dyn AssetStore>,
    clock: Arc<dyn Clock>,
}

impl Deck {
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

    /// Save `messages` as a new snapshot and refresh the summary.
    ///
    /// The title is the first user message cut to 30 characters, followed by
    /// `...`.
    pub async fn save_snapshot(&self, messages: &[DeckMessage]) -> Result<DeckItem> {
        if messages.is_empty() {
            return Err(AssetError::EmptySnapshot.into());
        }

        let title: String = messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.chars().take(TITLE_CHARS).collect())
            .unwrap_or_else(|| UNTITLED.to_string());

        // Two saves in the same millisecond take consecutive ids.
        let mut id = self.clock.now_millis();
        while self.assets.get(&asset_id(id)).await?.is_some() {
            id += 1;
        }
        let item = DeckItem {
            id,
            date: local_date(id),
            title: format!("{title}..."),
            data: messages.to_vec(),
        };

        let json = serde_json::to_vec(&item)?;
        self.assets.put(&asset_id(id), json).await?;
        tracing::debug!(id, "snapshot saved");

        self.sync_deck_meta().await?;
        Ok(item)
    }

    /// All snapshots, newest first.
    pub async fn list(&self) -> Result<Vec<DeckItem>> {
        let mut items = Vec::new();
        for id in self.assets.ids(DECK_PREFIX).await? {
            let Some(bytes) = self.assets.get(&id).await? else {
                continue;
            };
            let item: DeckItem =
                serde_json::from_slice(&bytes).map_err(|e| AssetError::Corrupt {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
            items.push(item);
        }
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    /// One snapshot by id.
    pub async fn get(&self, id: u64) -> Result<Option<DeckItem>> {
        let Some(bytes) = self.assets.get(&asset_id(id)).await? else {
            return Ok(None);
        };
        let item = serde_json::from_slice(&bytes).map_err(|e| AssetError::Corrupt {
            id: asset_id(id),
            reason: e.to_string(),
        })?;
        Ok(Some(item))
    }

    /// Delete a snapshot and refresh the summary.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.assets.delete(&asset_id(id)).await?;
        self.sync_deck_meta().await?;
        Ok(())
    }

    /// Recompute the summary and write it to [`DECK_META`].
    pub async fn sync_deck_meta(&self) -> Result<DeckMeta> {
        let items = self.list().await?;
        let meta = match items.first() {
            Some(newest) => DeckMeta {
                count: items.len(),
                last_title: newest.title.clone(),
                last_date: newest.date.clone(),
            },
            None => DeckMeta {
                count: 0,
                last_title: "Vazio".to_string(),
                last_date: "--/--".to_string(),
            },
        };
        self.store.set_json(DECK_META, &meta);
        Ok(meta)
    }
}

fn asset_id(id: u64) -> String {
    format!("{DECK_PREFIX}{id}")
}

fn local_date(millis: u64) -> String {
    Local
        .timestamp_millis_opt(millis as i64)
        .single()
        .map(|dt| dt.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_default()
}
