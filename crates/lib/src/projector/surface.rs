//! Surfaces, their element bindings, and the values they display.

use std::fmt;

use super::fragment::Fragment;
use crate::assets::DeckMeta;
use crate::constants::{
    API_KEY, DECK_META, DEFAULT_INFODOSE_NAME, DEFAULT_MODEL, DEFAULT_SOLAR_MODE,
    DEFAULT_SYSTEM_ROLE, DEFAULT_USER_NAME, EMPTY_DECK_TITLE, INFODOSE_NAME, MODEL, SOLAR_MODE,
    SYSTEM_ROLE, USER_NAME,
};
use crate::store::KeyValueStore;

/// The UI areas that project canonical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// The KOBLLUX chat widget and its settings drawer.
    ChatWidget,
    /// The Fusion floating card.
    FloatingCard,
    /// The external dashboard.
    Dashboard,
}

const CHAT_INPUTS: &[(&str, &str)] = &[
    ("inputUserId", USER_NAME),
    ("inputModel", MODEL),
    ("apiKeyInput", API_KEY),
    ("systemRoleInput", SYSTEM_ROLE),
];

const CARD_INPUTS: &[(&str, &str)] = &[("inputUser", USER_NAME), ("apiKeyInputSystem", API_KEY)];

impl SurfaceKind {
    pub fn name(self) -> &'static str {
        match self {
            SurfaceKind::ChatWidget => "chat",
            SurfaceKind::FloatingCard => "card",
            SurfaceKind::Dashboard => "dashboard",
        }
    }

    /// Keys whose changes trigger a re-render.
    pub fn watched_keys(self) -> &'static [&'static str] {
        match self {
            SurfaceKind::ChatWidget => &[
                USER_NAME,
                MODEL,
                INFODOSE_NAME,
                SOLAR_MODE,
                API_KEY,
                SYSTEM_ROLE,
            ],
            SurfaceKind::FloatingCard => &[USER_NAME, API_KEY],
            SurfaceKind::Dashboard => &[USER_NAME, INFODOSE_NAME, MODEL, DECK_META],
        }
    }

    /// Whether a change of `key` concerns this surface.
    pub fn watches(self, key: &str) -> bool {
        self.watched_keys().iter().any(|k| *k == key)
    }

    /// Input controls and the entry each one edits.
    pub fn inputs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SurfaceKind::ChatWidget => CHAT_INPUTS,
            SurfaceKind::FloatingCard => CARD_INPUTS,
            SurfaceKind::Dashboard => &[],
        }
    }

    /// The entry edited by input `element`.
    pub fn binding(self, element: &str) -> Option<&'static str> {
        self.inputs()
            .iter()
            .find(|(id, _)| *id == element)
            .map(|(_, key)| *key)
    }

    /// Write `snapshot` into `fragment`.
    ///
    /// Inputs that currently have focus are left alone so an edit in
    /// progress is never overwritten.
    pub fn render(self, snapshot: &Snapshot, fragment: &dyn Fragment) {
        let focused = fragment.focused();
        let write_input = |element: &str, value: &str| {
            if focused.as_deref() == Some(element) {
                tracing::trace!(element, "skipping focused input");
                return;
            }
            fragment.set_input(element, value);
        };

        match self {
            SurfaceKind::ChatWidget => {
                fragment.set_text("usernameDisplay", &snapshot.user_name);
                fragment.set_text("modeIndicator", &snapshot.mode_indicator());
                write_input("inputUserId", &snapshot.user_name);
                write_input("inputModel", &snapshot.model);
                write_input("apiKeyInput", &snapshot.api_key);
                write_input("systemRoleInput", &snapshot.system_role);
            }
            SurfaceKind::FloatingCard => {
                fragment.set_text("lblName", &snapshot.user_name);
                write_input("inputUser", &snapshot.user_name);
                write_input("apiKeyInputSystem", &snapshot.api_key);
            }
            SurfaceKind::Dashboard => {
                fragment.set_text("user-display", &snapshot.first_name());
                fragment.set_text("infodose-title", &snapshot.title());
                fragment.set_text("current-model", snapshot.model_short());
                fragment.set_text("deck-count", &snapshot.deck.count.to_string());
                fragment.set_text("deck-last", snapshot.deck_last());
            }
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical entries as read at one instant, with defaults substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub user_name: String,
    pub brand: String,
    pub model: String,
    pub solar_mode: String,
    pub api_key: String,
    pub system_role: String,
    pub deck: DeckMeta,
}

impl Snapshot {
    /// Read every projected entry from `store`.
    pub fn read(store: &KeyValueStore) -> Self {
        Self {
            user_name: store.get(USER_NAME, DEFAULT_USER_NAME),
            brand: store.get(INFODOSE_NAME, DEFAULT_INFODOSE_NAME),
            model: store.get(MODEL, DEFAULT_MODEL),
            solar_mode: store.get(SOLAR_MODE, DEFAULT_SOLAR_MODE),
            api_key: store.get(API_KEY, ""),
            system_role: store.get(SYSTEM_ROLE, DEFAULT_SYSTEM_ROLE),
            deck: store.get_json(DECK_META).unwrap_or_default(),
        }
    }

    /// First word of the display name, uppercased.
    pub fn first_name(&self) -> String {
        self.user_name
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_uppercase()
    }

    /// `"{brand} · {MODE}"`.
    pub fn mode_indicator(&self) -> String {
        format!("{} · {}", self.brand, self.solar_mode.to_uppercase())
    }

    /// The part of the model id after the provider prefix.
    pub fn model_short(&self) -> &str {
        self.model
            .split('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.model.as_str())
    }

    /// Dashboard title, `"{brand}OS"`.
    pub fn title(&self) -> String {
        format!("{}OS", self.brand)
    }

    /// Title of the newest snapshot.
    pub fn deck_last(&self) -> &str {
        if self.deck.last_title.is_empty() {
            EMPTY_DECK_TITLE
        } else {
            &self.deck.last_title
        }
    }
}
