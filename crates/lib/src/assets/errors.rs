//! Error types for the asset layer.

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset is larger than the configured ceiling.
    #[error("Asset of {size} bytes exceeds the {limit} byte limit")]
    QuotaExceeded { size: usize, limit: usize },

    /// A snapshot with no messages was requested.
    #[error("Cannot save an empty conversation")]
    EmptySnapshot,

    /// A stored asset could not be decoded.
    #[error("Asset '{id}' is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

impl AssetError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, AssetError::QuotaExceeded { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, AssetError::EmptySnapshot)
    }
}

impl From<AssetError> for crate::Error {
    fn from(err: AssetError) -> Self {
        crate::Error::Asset(err)
    }
}
