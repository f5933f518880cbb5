//! Error types for the master controller.

use thiserror::Error;

/// Errors raised by the [`MasterController`](super::MasterController).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A required field was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the rejected field
        field: &'static str,
    },

    /// The credential bundle is encrypted and this context has not unlocked it.
    #[error("The vault is locked; unlock it before changing credentials")]
    VaultLocked,

    /// The stored bundle envelope could not be read.
    #[error("Corrupt credential bundle: {reason}")]
    CorruptBundle {
        /// Description of the problem
        reason: String,
    },
}

impl ControllerError {
    /// Check if the request was rejected before any mutation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ControllerError::EmptyField { .. } | ControllerError::VaultLocked
        )
    }

    /// Check if the stored bundle is unreadable.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ControllerError::CorruptBundle { .. })
    }
}

impl From<ControllerError> for crate::Error {
    fn from(err: ControllerError) -> Self {
        crate::Error::Controller(err)
    }
}
