//! Error types for the storage backend.

use thiserror::Error;

/// Errors raised by a [`StorageBackend`](super::StorageBackend).
///
/// The key/value store never lets these escape its public read/write API;
/// they surface only from direct backend calls and file persistence.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The write would exceed the storage quota.
    #[error("Storage quota exceeded writing '{key}': {required} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes the area would hold after the write
        required: usize,
        /// Configured quota
        quota: usize,
    },

    /// Storage refuses access, e.g. in a privacy-restricted context.
    #[error("Storage unavailable: {reason}")]
    Unavailable {
        /// Why the storage cannot be used
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error is a quota rejection.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, BackendError::QuotaExceeded { .. })
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, BackendError::FileIo { .. })
    }

    /// Check if this error comes from (de)serializing persisted state.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. } | BackendError::DeserializationFailed { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
