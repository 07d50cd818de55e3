//! Photo picker error types.

use thiserror::Error;

/// Photo picker error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum PickerError {
    #[error("photo picking was cancelled")]
    Cancelled,

    #[error("selected file is not a supported image: {path}")]
    NotAnImage { path: String },

    #[error("failed to read picked file: {message}")]
    ReadFailed { message: String },

    #[error("photo picker unavailable: {message}")]
    Unavailable { message: String },
}

impl PickerError {
    /// Creates read failure error.
    #[must_use]
    pub fn read_failed(message: impl Into<String>) -> Self {
        Self::ReadFailed {
            message: message.into(),
        }
    }

    /// Creates unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
