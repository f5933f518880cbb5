//!
//! KOBLLUX: the shared state bus behind the KOBLLUX chat widget and the
//! Fusion floating card.
//!
//! Several UI surfaces share configuration (API key, user name, model, theme)
//! through one key/value storage and stay consistent by broadcasting every
//! write.
//!
//! ## Core Concepts
//!
//! * **Storage areas (`store::StorageArea`)**: The storage shared by every browsing context of a group, wrapping a pluggable `backend::StorageBackend`.
//! * **Key/value store (`store::KeyValueStore`)**: One context's view of the area. Values are always strings; writes never fail and always notify.
//! * **Change bus (`bus`)**: Synchronous same-document `ChangeEvent`s and asynchronous cross-context `StorageEvent`s.
//! * **Projectors (`projector::StateProjector`)**: Keep a surface's fragment in line with the store, skipping inputs that have focus.
//! * **Vault (`vault::Vault`)**: Argon2id + AES-256-GCM protection of the credential bundle, with an Unset / Locked / Unlocked lifecycle.
//! * **Master controller (`controller::MasterController`)**: Owns the credential list and is the single writer of identity entries.
//! * **Theme, assets and card layout**: Solar mode, background and style assets, saved conversations, and the floating card position.
//!
//! Last write wins. Consumers treat every notification as "something
//! changed" and re-read the store.

pub mod assets;
pub mod backend;
pub mod bus;
pub mod card;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod projector;
pub mod store;
pub mod theme;
pub mod vault;

pub use assets::{AssetManager, Deck, InMemoryAssets};
pub use bus::{ChangeBus, ChangeEvent, ContextId, StorageEvent, StorageEvents, Subscription};
pub use card::{CardLayout, CardMode};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SyncConfig;
pub use controller::{Credential, MasterController, SystemConfig};
pub use projector::{StateProjector, SurfaceKind};
pub use store::{KeyValueStore, StorageArea};
pub use theme::{SolarMode, Theme};
pub use vault::{EncryptedPayload, KdfParams, Vault, VaultState};

/// Result type used throughout the KOBLLUX library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the KOBLLUX library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured errors from the vault module
    #[error(transparent)]
    Vault(vault::VaultError),

    /// Structured errors from the controller module
    #[error(transparent)]
    Controller(controller::ControllerError),

    /// Structured errors from the projector module
    #[error(transparent)]
    Projector(projector::ProjectorError),

    /// Structured errors from the assets module
    #[error(transparent)]
    Asset(assets::AssetError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Vault(_) => "vault",
            Error::Controller(_) => "controller",
            Error::Projector(_) => "projector",
            Error::Asset(_) => "assets",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if persistent storage failed.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Backend(_) | Error::Io(_))
    }

    /// Check if this is the generic wrong-passphrase / corrupted-bundle failure.
    pub fn is_decryption_error(&self) -> bool {
        match self {
            Error::Vault(vault_err) => vault_err.is_decryption_failed(),
            _ => false,
        }
    }

    /// Check if the request was rejected before any mutation.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Vault(vault_err) => vault_err.is_validation_error(),
            Error::Controller(controller_err) => controller_err.is_validation_error(),
            Error::Projector(projector_err) => projector_err.is_validation_error(),
            Error::Asset(asset_err) => asset_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if a size or storage quota was exceeded.
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_quota_exceeded(),
            Error::Asset(asset_err) => asset_err.is_quota_exceeded(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Projector(projector_err) => projector_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
