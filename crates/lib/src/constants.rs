//! Canonical entry keys and default values shared by every surface.
//!
//! This module is the single place where entry keys are named. Every surface
//! reads and writes through these constants, and [`owner`] records which
//! component is allowed to write each key.

/// Namespace prefix for entries that surfaces project.
pub const NAMESPACE: &str = "di_";

/// Active API token used for outbound completion requests.
pub const API_KEY: &str = "di_apiKey";

/// Active model identifier.
pub const MODEL: &str = "di_modelName";

/// System role / prompt text.
pub const SYSTEM_ROLE: &str = "di_systemRole";

/// Display name of the local user.
pub const USER_NAME: &str = "di_userName";

/// Reference (asset id or URL) to the active background image.
pub const BG_ACTIVE: &str = "di_bgActive";

/// Reference to the custom style sheet asset.
pub const CUSTOM_CSS: &str = "di_customCss";

/// Theme mode: `day`, `sunset` or `night`.
pub const SOLAR_MODE: &str = "di_solarMode";

/// Auto-theme flag (`"true"` / `"false"`).
pub const SOLAR_AUTO: &str = "di_solarAuto";

/// Product/brand display name.
pub const INFODOSE_NAME: &str = "di_infodoseName";

/// JSON summary of saved conversation snapshots, read by the dashboard.
pub const DECK_META: &str = "di_deckMeta";

/// Credential bundle envelope (plain or encrypted).
pub const CREDENTIAL_BUNDLE: &str = "fusion_os_data_v2";

/// Floating card layout snapshot.
pub const UI_STATE: &str = "fusion_os_ui_state";

/// Literal token for a true boolean entry.
pub const TRUE: &str = "true";

/// Literal token for a false boolean entry.
pub const FALSE: &str = "false";

pub const DEFAULT_USER_NAME: &str = "Viajante";
pub const DEFAULT_INFODOSE_NAME: &str = "KOBLLUX";
pub const DEFAULT_SOLAR_MODE: &str = "night";
pub const DEFAULT_MODEL: &str = "auto";
pub const DEFAULT_SYSTEM_ROLE: &str = "Standard Assistant";

/// Display name held by the controller before anything was stored.
pub const GUEST_NAME: &str = "Convidado";

/// Shown by the dashboard when no snapshot has been saved.
pub const EMPTY_DECK_TITLE: &str = "Memória Vazia";

/// Entries written by [`KeyValueStore::seed_defaults`](crate::KeyValueStore::seed_defaults)
/// when absent.
pub const SEEDED_DEFAULTS: &[(&str, &str)] = &[
    (USER_NAME, DEFAULT_USER_NAME),
    (INFODOSE_NAME, DEFAULT_INFODOSE_NAME),
    (SOLAR_MODE, DEFAULT_SOLAR_MODE),
    (SOLAR_AUTO, TRUE),
];

/// The component allowed to write an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOwner {
    /// Only the master controller writes this key; surfaces are read-only.
    Controller,
    /// Any surface may write this key through a user-initiated action.
    Shared,
}

/// Returns the designated writer of `key`.
pub fn owner(key: &str) -> KeyOwner {
    match key {
        API_KEY | USER_NAME | SYSTEM_ROLE | CREDENTIAL_BUNDLE => KeyOwner::Controller,
        _ => KeyOwner::Shared,
    }
}
