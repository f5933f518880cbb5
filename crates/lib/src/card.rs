//! Floating card layout.
//!
//! The card is shown as a full card, a draggable orb, or a docked HUD. The
//! mode and the orb position are saved under [`UI_STATE`] and restored on
//! load.

use serde::{Deserialize, Serialize};

use crate::constants::UI_STATE;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardMode {
    #[default]
    Card,
    Orb,
    Hud,
}

/// Saved layout. Positions are CSS lengths such as `"120px"`, empty when
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardLayout {
    pub mode: CardMode,
    pub left: String,
    pub top: String,
}

impl CardLayout {
    /// Restore the saved layout. Missing or unreadable state yields the
    /// default card layout.
    pub fn load(store: &KeyValueStore) -> Self {
        let layout: Self = store.get_json(UI_STATE).unwrap_or_default();
        match layout.mode {
            CardMode::Orb => layout,
            // Only the orb keeps a free position.
            mode => Self {
                mode,
                ..Self::default()
            },
        }
    }

    /// Save this layout.
    pub fn save(&self, store: &KeyValueStore) {
        store.set_json(UI_STATE, self);
    }
}
