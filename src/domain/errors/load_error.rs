//! Image load error types.

use thiserror::Error;

/// Failure of a single image load.
///
/// Cloneable so one failure can be delivered to every subscriber of an
/// in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    #[error("image not found: {message}")]
    NotFound { message: String },

    #[error("network unavailable: {message}")]
    NetworkUnavailable { message: String },

    #[error("failed to decode image: {message}")]
    DecodeFailure { message: String },

    #[error("image load cancelled")]
    Cancelled,
}

impl LoadError {
    /// Creates not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            message: message.into(),
        }
    }

    /// Returns whether the load was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::NetworkUnavailable { .. })
    }
}
