//! Full-resolution view of a single item.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::entities::{ImagePayload, ItemId};
use crate::domain::errors::GalleryError;
use crate::domain::ports::{GalleryDataSource, ImageFetcherPort};

/// State of the detail view.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub enum DetailState {
    /// Nothing open.
    #[default]
    Idle,
    /// Resolving and fetching the original.
    Loading(ItemId),
    /// Original available.
    Loaded { id: ItemId, payload: ImagePayload },
    /// The data source has no original for the item.
    Missing(ItemId),
    /// Resolving or fetching failed.
    Failed { id: ItemId, error: GalleryError },
}

impl DetailState {
    /// Item the state refers to.
    #[must_use]
    pub const fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Idle => None,
            Self::Loading(id) | Self::Missing(id) => Some(*id),
            Self::Loaded { id, .. } | Self::Failed { id, .. } => Some(*id),
        }
    }

    /// Returns true while loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

/// Loads originals for the detail view.
///
/// Originals go straight to the fetcher and never touch the thumbnail cache.
#[derive(Clone)]
pub struct DetailPresenter {
    data_source: Arc<dyn GalleryDataSource>,
    fetcher: Arc<dyn ImageFetcherPort>,
    state: Arc<watch::Sender<DetailState>>,
}

impl DetailPresenter {
    /// Creates a presenter resolving originals through `data_source` and
    /// fetching them with `fetcher`.
    #[must_use]
    pub fn new(data_source: Arc<dyn GalleryDataSource>, fetcher: Arc<dyn ImageFetcherPort>) -> Self {
        let (state, _) = watch::channel(DetailState::Idle);
        Self {
            data_source,
            fetcher,
            state: Arc::new(state),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Watches state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Opens `id`, resolving its original once and fetching it.
    ///
    /// The result is published only if the view still shows `id` when the
    /// fetch completes.
    pub async fn open(&self, id: ItemId) -> DetailState {
        self.state.send_replace(DetailState::Loading(id));

        let result = match self.data_source.fetch_original(&id).await {
            Ok(Some(locator)) => {
                debug!(id = %id, locator = %locator, "Fetching original");
                match self.fetcher.fetch(&locator).await {
                    Ok(payload) => DetailState::Loaded { id, payload },
                    Err(e) => {
                        warn!(id = %id, error = %e, "Failed to load original");
                        DetailState::Failed {
                            id,
                            error: e.into(),
                        }
                    }
                }
            }
            Ok(None) => DetailState::Missing(id),
            Err(error) => {
                warn!(id = %id, error = %error, "Failed to resolve original");
                DetailState::Failed { id, error }
            }
        };

        self.state.send_if_modified(|current| {
            if current.is_loading() && current.item_id() == Some(id) {
                *current = result.clone();
                true
            } else {
                false
            }
        });
        result
    }

    /// Closes the view.
    pub fn close(&self) {
        self.state.send_replace(DetailState::Idle);
    }
}
