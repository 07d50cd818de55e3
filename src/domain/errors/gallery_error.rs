//! Gallery operation error types.

use thiserror::Error;

use crate::domain::entities::ItemId;

/// Errors surfaced by gallery data sources and presenters.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum GalleryError {
    #[error("item {id} not found")]
    ItemNotFound { id: ItemId },

    #[error("data source error: {message}")]
    DataSource { message: String },

    #[error("operation requires edit mode")]
    EditModeRequired,

    #[error("operation unavailable while editing")]
    EditModeActive,

    #[error("photo picker error: {0}")]
    Picker(#[from] super::PickerError),

    #[error("image load error: {0}")]
    Load(#[from] super::LoadError),
}

impl GalleryError {
    /// Creates data source error.
    #[must_use]
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
        }
    }

    /// Returns whether the caller can retry the operation as is.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DataSource { .. } | Self::Load(_) | Self::Picker(_)
        )
    }
}
