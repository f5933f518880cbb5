//! Error types for state projection.

use thiserror::Error;

/// Errors raised when a surface commits a user edit.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProjectorError {
    /// Surfaces may not write keys owned by the master controller.
    #[error("'{key}' is owned by the master controller and is read-only for surfaces")]
    ReadOnlyKey {
        /// The rejected key
        key: String,
    },

    /// The surface has no input control bound to this element.
    #[error("No input '{element}' on the {surface} surface")]
    UnknownElement {
        /// The element id
        element: String,
        /// The surface name
        surface: &'static str,
    },
}

impl ProjectorError {
    /// Check if the edit was rejected by ownership rules.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ProjectorError::ReadOnlyKey { .. })
    }

    /// Check if the element does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProjectorError::UnknownElement { .. })
    }
}

impl From<ProjectorError> for crate::Error {
    fn from(err: ProjectorError) -> Self {
        crate::Error::Projector(err)
    }
}
