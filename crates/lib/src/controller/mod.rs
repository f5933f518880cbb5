//! The master controller.
//!
//! [`MasterController`] owns the authoritative credential list, the display
//! name and the system role, and is the only writer of their canonical
//! entries ([`API_KEY`], [`USER_NAME`], [`SYSTEM_ROLE`] and the bundle under
//! [`CREDENTIAL_BUNDLE`]). Surfaces observe those entries through the bus and
//! never write them.
//!
//! Mutations update the working copy and push the affected canonical entries
//! immediately. The bundle itself is written by [`persist`], which encrypts it
//! when this context holds the vault passphrase.
//!
//! The bundle entry holds a single envelope, `{"isEncrypted": bool, "data": ..}`,
//! so the plain and encrypted forms can never both be present.
//!
//! [`persist`]: MasterController::persist

mod credentials;
pub mod errors;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use credentials::{Credential, CredentialList};
pub use errors::ControllerError;

use crate::clock::{Clock, SystemClock};
use crate::constants::{
    API_KEY, CREDENTIAL_BUNDLE, DEFAULT_SYSTEM_ROLE, GUEST_NAME, INFODOSE_NAME, MODEL,
    SYSTEM_ROLE, USER_NAME,
};
use crate::store::KeyValueStore;
use crate::vault::{EncryptedPayload, Vault, VaultError, VaultState};
use crate::Result;

/// The structured object carried by the credential bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPlaintext {
    /// Credential list
    #[serde(default)]
    pub keys: CredentialList,
    /// Display name
    #[serde(default)]
    pub user: String,
    /// System role text
    #[serde(rename = "systemRole", default, skip_serializing_if = "String::is_empty")]
    pub system_role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateEnvelope {
    #[serde(rename = "isEncrypted")]
    is_encrypted: bool,
    data: serde_json::Value,
}

/// Values from the system configuration panel.
///
/// Fields that are `None` or blank after trimming are left alone.
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    /// Active model identifier
    pub model: Option<String>,
    /// Brand display name
    pub brand: Option<String>,
    /// API token for the active credential
    pub token: Option<String>,
    /// System role text
    pub system_role: Option<String>,
}

/// Owner of the credential list and the identity entries.
#[derive(Debug)]
pub struct MasterController {
    store: KeyValueStore,
    clock: Arc<dyn Clock>,
    vault: Vault,
    credentials: CredentialList,
    user: String,
    system_role: String,
    /// Encrypted bundle found by `hydrate`, waiting for `unlock`.
    sealed: Option<EncryptedPayload>,
}

impl MasterController {
    /// Controller on `store` using the system clock and the store's KDF settings.
    pub fn new(store: KeyValueStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Controller with an explicit clock.
    pub fn with_clock(store: KeyValueStore, clock: Arc<dyn Clock>) -> Self {
        let vault = Vault::new(store.config().kdf);
        Self {
            store,
            clock,
            vault,
            credentials: CredentialList::new(),
            user: GUEST_NAME.to_string(),
            system_role: DEFAULT_SYSTEM_ROLE.to_string(),
            sealed: None,
        }
    }

    /// Append a credential.
    ///
    /// The first credential becomes active and, if it has a token, is pushed
    /// to the active API key entry. A blank name is rejected without mutation.
    pub fn add_credential(&mut self, name: &str, token: &str) -> Result<Credential> {
        self.ensure_writable()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ControllerError::EmptyField { field: "name" }.into());
        }

        let credential = Credential {
            id: self.fresh_id(),
            name: name.to_string(),
            token: token.trim().to_string(),
            active: false,
        };
        let added = self.credentials.push(credential).clone();
        tracing::debug!(id = %added.id, active = added.active, "credential added");

        if added.active && !added.token.is_empty() {
            self.store.set(API_KEY, added.token.clone());
        }
        Ok(added)
    }

    /// Make `id` the only active credential.
    ///
    /// A non-empty token is pushed to the active API key entry. An unknown id
    /// changes nothing and still succeeds.
    pub fn activate(&mut self, id: &str) -> Result<()> {
        self.ensure_writable()?;
        match self.credentials.activate(id) {
            Some(credential) => {
                let token = credential.token.clone();
                tracing::debug!(id, "credential activated");
                if !token.is_empty() {
                    self.store.set(API_KEY, token);
                }
            }
            None => tracing::debug!(id, "activate ignored unknown credential"),
        }
        Ok(())
    }

    /// Remove credential `id`. No other credential becomes active.
    pub fn remove(&mut self, id: &str) -> Result<Option<Credential>> {
        self.ensure_writable()?;
        let removed = self.credentials.remove(id);
        if removed.is_some() {
            tracing::debug!(id, "credential removed");
        }
        Ok(removed)
    }

    /// Set the display name and push it to its entry.
    pub fn set_display_name(&mut self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        self.user = name.to_string();
        self.store.set(USER_NAME, self.user.clone());
        Ok(())
    }

    /// Set the system role and push it to its entry.
    pub fn set_system_role(&mut self, role: &str) -> Result<()> {
        self.ensure_writable()?;
        let role = role.trim();
        if role.is_empty() {
            return Err(ControllerError::EmptyField {
                field: "system role",
            }
            .into());
        }
        self.system_role = role.to_string();
        self.store.set(SYSTEM_ROLE, self.system_role.clone());
        Ok(())
    }

    /// Apply the system configuration panel.
    ///
    /// A token replaces the active credential's token (when there is one)
    /// and the active API key entry.
    pub fn apply_system_config(&mut self, config: &SystemConfig) -> Result<()> {
        let filled = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let token = filled(&config.token);
        let role = filled(&config.system_role);
        if token.is_some() || role.is_some() {
            self.ensure_writable()?;
        }

        if let Some(token) = token {
            if let Some(active) = self.credentials.active_mut() {
                active.token = token.clone();
            }
            self.store.set(API_KEY, token);
        }
        if let Some(model) = filled(&config.model) {
            self.store.set(MODEL, model);
        }
        if let Some(brand) = filled(&config.brand) {
            self.store.set(INFODOSE_NAME, brand);
        }
        if let Some(role) = role {
            self.system_role = role;
            self.store.set(SYSTEM_ROLE, self.system_role.clone());
        }
        Ok(())
    }

    /// Write the credential bundle.
    ///
    /// Encrypted with the session passphrase when the vault is unlocked,
    /// plain when no passphrase was ever set. A locked vault refuses, since
    /// its working copy is empty and writing it would destroy the bundle.
    ///
    /// The freshly sealed payload also replaces the one kept for
    /// [`unlock`](Self::unlock), so a later relock opens the list just written.
    pub async fn persist(&mut self) -> Result<()> {
        let plaintext = self.plaintext();
        let envelope = match self.vault.state() {
            VaultState::Unset => StateEnvelope {
                is_encrypted: false,
                data: serde_json::to_value(&plaintext)?,
            },
            VaultState::Unlocked => {
                let payload = self.vault.seal(&plaintext).await?;
                let bundle = payload.to_bundle_string()?;
                self.sealed = Some(payload);
                StateEnvelope {
                    is_encrypted: true,
                    data: serde_json::Value::String(bundle),
                }
            }
            VaultState::Locked => return Err(ControllerError::VaultLocked.into()),
        };

        self.write_envelope(&envelope)
    }

    /// Load the credential bundle from storage.
    ///
    /// An encrypted bundle leaves the vault `Locked` and the list empty until
    /// [`unlock`](Self::unlock). A plain bundle populates the list and pushes
    /// the identity entries. A missing bundle leaves the defaults in place.
    pub fn hydrate(&mut self) -> Result<VaultState> {
        if let Some(role) = self.store.get_opt(SYSTEM_ROLE).filter(|r| !r.is_empty()) {
            self.system_role = role;
        }

        let Some(raw) = self.store.get_opt(CREDENTIAL_BUNDLE) else {
            self.vault.mark_unset();
            return Ok(self.vault.state());
        };

        let envelope: StateEnvelope =
            serde_json::from_str(&raw).map_err(|e| ControllerError::CorruptBundle {
                reason: e.to_string(),
            })?;

        if envelope.is_encrypted {
            let payload = match envelope.data {
                serde_json::Value::String(bundle) => EncryptedPayload::from_bundle_str(&bundle)?,
                other => serde_json::from_value(other).map_err(|_| VaultError::DecryptionFailed)?,
            };
            self.credentials.clear();
            self.sealed = Some(payload);
            self.vault.mark_locked();
            tracing::debug!("credential bundle is encrypted; waiting for unlock");
        } else {
            let plaintext: VaultPlaintext =
                serde_json::from_value(envelope.data).map_err(|e| ControllerError::CorruptBundle {
                    reason: e.to_string(),
                })?;
            self.vault.mark_unset();
            self.sealed = None;
            self.adopt(plaintext);
            self.push_identity();
        }
        Ok(self.vault.state())
    }

    /// Decrypt the stored bundle, populate the list and push identity entries.
    ///
    /// A wrong passphrase leaves the vault locked and the store untouched.
    pub async fn unlock(&mut self, passphrase: &str) -> Result<()> {
        let Some(payload) = self.sealed.clone() else {
            return Err(VaultError::InvalidState {
                operation: "unlock",
                state: self.vault.state(),
            }
            .into());
        };

        let plaintext: VaultPlaintext = self.vault.unlock(passphrase, &payload).await?;
        self.adopt(plaintext);
        self.push_identity();
        Ok(())
    }

    /// Protect the bundle with `passphrase` and write it.
    ///
    /// Sets a passphrase from `Unset`, or replaces it from `Unlocked`. The
    /// vault ends `Locked` and the decrypted working copy is dropped.
    pub async fn lock(&mut self, passphrase: &str) -> Result<()> {
        let plaintext = self.plaintext();
        let payload = match self.vault.state() {
            VaultState::Unlocked => self.vault.change_passphrase(passphrase, &plaintext).await?,
            _ => self.vault.lock(passphrase, &plaintext).await?,
        };

        self.write_envelope(&StateEnvelope {
            is_encrypted: true,
            data: serde_json::Value::String(payload.to_bundle_string()?),
        })?;
        self.sealed = Some(payload);
        self.credentials.clear();
        Ok(())
    }

    /// End the vault session and drop the decrypted working copy.
    pub fn relock(&mut self) -> Result<()> {
        self.vault.relock()?;
        self.credentials.clear();
        Ok(())
    }

    /// Current vault state.
    pub fn vault_state(&self) -> VaultState {
        self.vault.state()
    }

    /// The working credential list.
    pub fn credentials(&self) -> &[Credential] {
        self.credentials.as_slice()
    }

    /// The active credential, if any.
    pub fn active(&self) -> Option<&Credential> {
        self.credentials.active()
    }

    /// The working display name.
    pub fn display_name(&self) -> &str {
        &self.user
    }

    /// The working system role.
    pub fn system_role(&self) -> &str {
        &self.system_role
    }

    /// The store this controller writes to.
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.vault.state() == VaultState::Locked {
            return Err(ControllerError::VaultLocked.into());
        }
        Ok(())
    }

    fn fresh_id(&self) -> String {
        let mut millis = self.clock.now_millis();
        loop {
            let id = credentials::base36(millis);
            if !self.credentials.contains(&id) {
                return id;
            }
            millis += 1;
        }
    }

    fn plaintext(&self) -> VaultPlaintext {
        VaultPlaintext {
            keys: self.credentials.clone(),
            user: self.user.clone(),
            system_role: self.system_role.clone(),
        }
    }

    fn adopt(&mut self, plaintext: VaultPlaintext) {
        self.credentials = plaintext.keys;
        self.user = if plaintext.user.is_empty() {
            GUEST_NAME.to_string()
        } else {
            plaintext.user
        };
        if !plaintext.system_role.is_empty() {
            self.system_role = plaintext.system_role;
        }
    }

    /// Push the active token, display name and system role to their entries.
    fn push_identity(&self) {
        if let Some(active) = self.credentials.active().filter(|c| !c.token.is_empty()) {
            self.store.set(API_KEY, active.token.clone());
        }
        if self.user != GUEST_NAME {
            self.store.set(USER_NAME, self.user.clone());
        }
        self.store.set(SYSTEM_ROLE, self.system_role.clone());
    }

    fn write_envelope(&self, envelope: &StateEnvelope) -> Result<()> {
        let json = serde_json::to_string(envelope).map_err(|e| {
            tracing::error!(error = %e, "failed to serialize credential bundle");
            e
        })?;
        self.store.set(CREDENTIAL_BUNDLE, json);
        Ok(())
    }
}
