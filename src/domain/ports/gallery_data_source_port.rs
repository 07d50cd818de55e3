//! Gallery data source port definition.

use async_trait::async_trait;

use crate::domain::entities::{GalleryItem, ItemId, Locator, PickedImage};
use crate::domain::errors::GalleryError;

/// Capability set a gallery backend provides to the grid and detail views.
///
/// Implemented by the caller; the grid only ever goes through these
/// operations and never mutates the items directly.
#[async_trait]
pub trait GalleryDataSource: Send + Sync {
    /// Returns the current items in display order.
    fn list_items(&self) -> Vec<GalleryItem>;

    /// Populates the item list. Implementations may skip the work when the
    /// list was already fetched.
    async fn fetch_thumbnails(&self) -> Result<(), GalleryError>;

    /// Resolves the locator of the full-resolution image for an item.
    async fn fetch_original(&self, id: &ItemId) -> Result<Option<Locator>, GalleryError>;

    /// Submits a newly picked image.
    async fn submit_image(&self, image: PickedImage) -> Result<(), GalleryError>;

    /// Removes an item by identity.
    async fn remove_item(&self, id: &ItemId) -> Result<(), GalleryError>;

    /// Forgets any fetched state and fetches the item list again.
    async fn refresh(&self) -> Result<(), GalleryError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::RwLock;
    use tokio::sync::Semaphore;

    /// In-memory data source for testing.
    pub struct MockDataSource {
        items: RwLock<Vec<GalleryItem>>,
        pending: RwLock<Vec<GalleryItem>>,
        originals: RwLock<HashMap<ItemId, Locator>>,
        submitted: RwLock<Vec<PickedImage>>,
        fail_remove: AtomicBool,
        remove_gate: Option<Arc<Semaphore>>,
        fetch_calls: AtomicUsize,
        original_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
    }

    impl MockDataSource {
        /// Creates a source that yields `items` on the first fetch.
        pub fn new(items: Vec<GalleryItem>) -> Self {
            Self {
                items: RwLock::new(Vec::new()),
                pending: RwLock::new(items),
                originals: RwLock::new(HashMap::new()),
                submitted: RwLock::new(Vec::new()),
                fail_remove: AtomicBool::new(false),
                remove_gate: None,
                fetch_calls: AtomicUsize::new(0),
                original_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
            }
        }

        /// Makes removals wait for a permit on `gate`.
        pub fn with_remove_gate(mut self, gate: Arc<Semaphore>) -> Self {
            self.remove_gate = Some(gate);
            self
        }

        /// Registers the original locator of an item.
        pub fn set_original(&self, id: ItemId, locator: impl Into<Locator>) {
            self.originals.write().insert(id, locator.into());
        }

        /// Replaces the items returned by the next fetch or refresh.
        pub fn set_next_items(&self, items: Vec<GalleryItem>) {
            *self.pending.write() = items;
        }

        /// Makes removals fail.
        pub fn set_fail_remove(&self, value: bool) {
            self.fail_remove.store(value, Ordering::SeqCst);
        }

        /// Images submitted so far.
        pub fn submitted(&self) -> Vec<PickedImage> {
            self.submitted.read().clone()
        }

        /// Number of `fetch_original` calls.
        pub fn original_calls(&self) -> usize {
            self.original_calls.load(Ordering::SeqCst)
        }

        /// Number of `fetch_thumbnails` calls.
        pub fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }

        /// Number of `refresh` calls.
        pub fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GalleryDataSource for MockDataSource {
        fn list_items(&self) -> Vec<GalleryItem> {
            self.items.read().clone()
        }

        async fn fetch_thumbnails(&self) -> Result<(), GalleryError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            *self.items.write() = self.pending.read().clone();
            Ok(())
        }

        async fn fetch_original(&self, id: &ItemId) -> Result<Option<Locator>, GalleryError> {
            self.original_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.originals.read().get(id).cloned())
        }

        async fn submit_image(&self, image: PickedImage) -> Result<(), GalleryError> {
            let item = GalleryItem::new(None, Some(image.locator.clone()));
            self.items.write().push(item);
            self.submitted.write().push(image);
            Ok(())
        }

        async fn remove_item(&self, id: &ItemId) -> Result<(), GalleryError> {
            if let Some(gate) = &self.remove_gate {
                gate.acquire()
                    .await
                    .map_err(|_| GalleryError::data_source("gate closed"))?
                    .forget();
            }
            if self.fail_remove.load(Ordering::SeqCst) {
                return Err(GalleryError::data_source("mock removal failure"));
            }
            let mut items = self.items.write();
            let before = items.len();
            items.retain(|item| item.id != *id);
            if items.len() == before {
                return Err(GalleryError::ItemNotFound { id: *id });
            }
            Ok(())
        }

        async fn refresh(&self) -> Result<(), GalleryError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_thumbnails().await
        }
    }
}
