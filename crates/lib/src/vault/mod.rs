//! Passphrase vault for the credential bundle.
//!
//! The vault holds no credentials itself. It tracks whether a bundle is
//! encrypted and whether this context holds the session passphrase, and it
//! turns plaintexts into [`EncryptedPayload`]s and back.
//!
//! ```text
//!   Unset --lock(p)--> Locked --unlock(p)--> Unlocked --relock()--> Locked
//!                                            Unlocked --change_passphrase(q)--> Locked
//! ```
//!
//! A failed unlock leaves the vault `Locked`. Key derivation and cipher work
//! run on the blocking pool, so every crypto operation is an await point.
//!
//! The session passphrase lives only in memory and is zeroized when dropped.
//! Each context unlocks on its own, even though the bundle is shared.

pub mod crypto;
pub mod errors;

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use zeroize::Zeroizing;

pub use crypto::{EncryptedPayload, KdfParams};
pub use errors::VaultError;

use crate::Result;

/// Lifecycle state of a [`Vault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No encrypted bundle is stored.
    Unset,
    /// An encrypted bundle is stored and no session passphrase is held.
    Locked,
    /// The session passphrase is held in memory.
    Unlocked,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VaultState::Unset => "unset",
            VaultState::Locked => "locked",
            VaultState::Unlocked => "unlocked",
        };
        f.write_str(s)
    }
}

/// Volatile copy of the passphrase, wiped on drop.
struct SessionPassphrase(Zeroizing<String>);

impl SessionPassphrase {
    fn new(passphrase: &str) -> Self {
        Self(Zeroizing::new(passphrase.to_string()))
    }
}

impl fmt::Debug for SessionPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionPassphrase(..)")
    }
}

/// Passphrase state machine around the credential bundle.
#[derive(Debug)]
pub struct Vault {
    state: VaultState,
    session: Option<SessionPassphrase>,
    kdf: KdfParams,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}

impl Vault {
    /// A vault in the `Unset` state using `kdf` for new bundles.
    pub fn new(kdf: KdfParams) -> Self {
        Self {
            state: VaultState::Unset,
            session: None,
            kdf,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Whether a session passphrase is held.
    pub fn is_unlocked(&self) -> bool {
        self.state == VaultState::Unlocked
    }

    /// Cost parameters used for new bundles.
    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Record that an encrypted bundle was found in storage.
    ///
    /// Any session passphrase is dropped: a reload always starts locked.
    pub(crate) fn mark_locked(&mut self) {
        self.session = None;
        self.state = VaultState::Locked;
    }

    /// Record that storage holds no encrypted bundle.
    pub(crate) fn mark_unset(&mut self) {
        self.session = None;
        self.state = VaultState::Unset;
    }

    /// Encrypt `plaintext` under a new passphrase and move to `Locked`.
    ///
    /// Valid from `Unset` (creating the passphrase) and from `Unlocked`
    /// (replacing it). A locked vault must be unlocked first.
    pub async fn lock<T: Serialize + ?Sized>(
        &mut self,
        passphrase: &str,
        plaintext: &T,
    ) -> Result<EncryptedPayload> {
        if self.state == VaultState::Locked {
            return Err(VaultError::InvalidState {
                operation: "lock",
                state: self.state,
            }
            .into());
        }
        if passphrase.is_empty() {
            return Err(VaultError::EmptyPassphrase.into());
        }

        let payload = encrypt_blocking(plaintext, passphrase, self.kdf).await?;
        self.session = None;
        self.state = VaultState::Locked;
        tracing::debug!("vault locked");
        Ok(payload)
    }

    /// Replace the passphrase of an unlocked vault.
    ///
    /// Behaves as [`lock`](Self::lock) with the new passphrase.
    pub async fn change_passphrase<T: Serialize + ?Sized>(
        &mut self,
        new_passphrase: &str,
        plaintext: &T,
    ) -> Result<EncryptedPayload> {
        if self.state != VaultState::Unlocked {
            return Err(VaultError::InvalidState {
                operation: "change the passphrase",
                state: self.state,
            }
            .into());
        }
        self.lock(new_passphrase, plaintext).await
    }

    /// Decrypt `payload` and hold `passphrase` for the session.
    ///
    /// On failure the state is left unchanged.
    pub async fn unlock<T: DeserializeOwned>(
        &mut self,
        passphrase: &str,
        payload: &EncryptedPayload,
    ) -> Result<T> {
        if self.state != VaultState::Locked {
            return Err(VaultError::InvalidState {
                operation: "unlock",
                state: self.state,
            }
            .into());
        }

        let bytes = decrypt_blocking(payload.clone(), passphrase, self.kdf).await?;
        let plaintext =
            serde_json::from_slice(&bytes).map_err(|_| VaultError::DecryptionFailed)?;

        self.session = Some(SessionPassphrase::new(passphrase));
        self.state = VaultState::Unlocked;
        tracing::debug!("vault unlocked");
        Ok(plaintext)
    }

    /// Drop the session passphrase, returning to `Locked`.
    pub fn relock(&mut self) -> Result<()> {
        if self.state != VaultState::Unlocked {
            return Err(VaultError::InvalidState {
                operation: "relock",
                state: self.state,
            }
            .into());
        }
        self.session = None;
        self.state = VaultState::Locked;
        tracing::debug!("vault session ended");
        Ok(())
    }

    /// Encrypt `plaintext` with the session passphrase.
    pub async fn seal<T: Serialize + ?Sized>(&self, plaintext: &T) -> Result<EncryptedPayload> {
        let Some(session) = &self.session else {
            return Err(VaultError::InvalidState {
                operation: "seal",
                state: self.state,
            }
            .into());
        };
        encrypt_blocking(plaintext, &session.0, self.kdf).await
    }
}

async fn encrypt_blocking<T: Serialize + ?Sized>(
    plaintext: &T,
    passphrase: &str,
    kdf: KdfParams,
) -> Result<EncryptedPayload> {
    let json = Zeroizing::new(serde_json::to_vec(plaintext).map_err(|e| {
        VaultError::EncryptionFailed {
            reason: format!("Failed to serialize plaintext: {e}"),
        }
    })?);
    let passphrase = Zeroizing::new(passphrase.to_string());

    tokio::task::spawn_blocking(move || crypto::encrypt_bytes(&json, &passphrase, &kdf))
        .await
        .map_err(|e| VaultError::Task {
            reason: e.to_string(),
        })?
}

async fn decrypt_blocking(
    payload: EncryptedPayload,
    passphrase: &str,
    kdf: KdfParams,
) -> Result<Zeroizing<Vec<u8>>> {
    let passphrase = Zeroizing::new(passphrase.to_string());

    tokio::task::spawn_blocking(move || crypto::decrypt_bytes(&payload, &passphrase, &kdf))
        .await
        .map_err(|e| VaultError::Task {
            reason: e.to_string(),
        })?
}
