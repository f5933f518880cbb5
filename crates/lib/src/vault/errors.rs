//! Error types for the credential vault.

use thiserror::Error;

use super::VaultState;

/// Errors raised by the vault.
///
/// Unlike storage failures these always reach the caller: continuing with a
/// wrong or partial credential bundle is never acceptable.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum VaultError {
    /// Authenticated decryption failed.
    ///
    /// A wrong passphrase, a corrupted bundle and a tampered bundle all look
    /// the same, so they share one message.
    #[error("incorrect passphrase or corrupted data")]
    DecryptionFailed,

    /// Encryption could not be performed.
    #[error("Encryption failed: {reason}")]
    EncryptionFailed {
        /// Description of the failure
        reason: String,
    },

    /// The key derivation parameters were rejected.
    #[error("Key derivation failed: {reason}")]
    KeyDerivation {
        /// Description of the failure
        reason: String,
    },

    /// The passphrase was empty.
    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    /// The operation is not valid in the current vault state.
    #[error("Cannot {operation} while the vault is {state}")]
    InvalidState {
        /// The attempted operation
        operation: &'static str,
        /// The state the vault was in
        state: VaultState,
    },

    /// The blocking crypto task did not complete.
    #[error("Crypto task failed: {reason}")]
    Task {
        /// Description of the failure
        reason: String,
    },
}

impl VaultError {
    /// Check if this is the generic decryption failure.
    pub fn is_decryption_failed(&self) -> bool {
        matches!(self, VaultError::DecryptionFailed)
    }

    /// Check if the input was rejected before any work was done.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            VaultError::EmptyPassphrase | VaultError::InvalidState { .. }
        )
    }
}

impl From<VaultError> for crate::Error {
    fn from(err: VaultError) -> Self {
        crate::Error::Vault(err)
    }
}
