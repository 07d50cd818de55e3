//! Demo gallery backed by picsum.photos.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::entities::{GalleryItem, ItemId, Locator, PickedImage};
use crate::domain::errors::GalleryError;
use crate::domain::ports::GalleryDataSource;

const PICSUM_BASE: &str = "https://picsum.photos";

#[derive(Default)]
struct DemoState {
    ids: Vec<i64>,
    identities: HashMap<i64, ItemId>,
    items: Vec<GalleryItem>,
    uploads: Vec<GalleryItem>,
    did_fetch: bool,
}

impl DemoState {
    fn identity(&mut self, number: i64) -> ItemId {
        *self.identities.entry(number).or_default()
    }
}

/// Gallery of numbered picsum photos plus images added through the picker.
///
/// Uploads only live in memory.
pub struct DemoDataSource {
    state: RwLock<DemoState>,
}

impl DemoDataSource {
    /// Creates a gallery showing the given photo ids.
    #[must_use]
    pub fn new(ids: Vec<i64>) -> Self {
        Self {
            state: RwLock::new(DemoState {
                ids,
                ..DemoState::default()
            }),
        }
    }

    /// Thumbnail URL for a photo id.
    ///
    /// The height varies per id so the grid shows mixed aspect ratios.
    #[must_use]
    pub fn thumbnail_locator(number: i64) -> Locator {
        let height = 200 + (number * 37).rem_euclid(101);
        Locator::new(format!("{PICSUM_BASE}/id/{number}/200/{height}"))
    }

    /// Full-size URL for a photo id.
    #[must_use]
    pub fn original_locator(number: i64) -> Locator {
        Locator::new(format!("{PICSUM_BASE}/id/{number}/1200/800"))
    }

    /// Photo ids currently shown.
    #[must_use]
    pub fn ids(&self) -> Vec<i64> {
        self.state.read().ids.clone()
    }
}

#[async_trait]
impl GalleryDataSource for DemoDataSource {
    fn list_items(&self) -> Vec<GalleryItem> {
        self.state.read().items.clone()
    }

    async fn fetch_thumbnails(&self) -> Result<(), GalleryError> {
        let mut state = self.state.write();
        if state.did_fetch {
            return Ok(());
        }

        let mut items = Vec::with_capacity(state.ids.len() + state.uploads.len());
        for number in state.ids.clone() {
            let id = state.identity(number);
            items.push(GalleryItem {
                id,
                number: Some(number),
                locator: Some(Self::thumbnail_locator(number)),
            });
        }
        items.extend(state.uploads.iter().cloned());

        debug!(count = items.len(), "Fetched demo thumbnails");
        state.items = items;
        state.did_fetch = true;
        Ok(())
    }

    async fn fetch_original(&self, id: &ItemId) -> Result<Option<Locator>, GalleryError> {
        let state = self.state.read();
        let item = state
            .items
            .iter()
            .find(|item| item.id == *id)
            .ok_or(GalleryError::ItemNotFound { id: *id })?;
        Ok(match item.number {
            Some(number) => Some(Self::original_locator(number)),
            None => item.locator.clone(),
        })
    }

    async fn submit_image(&self, image: PickedImage) -> Result<(), GalleryError> {
        let item = GalleryItem::new(None, Some(image.locator.clone()));
        info!(locator = %image.locator, kind = %image.kind, "Added demo image");
        let mut state = self.state.write();
        state.uploads.push(item.clone());
        state.items.push(item);
        Ok(())
    }

    async fn remove_item(&self, id: &ItemId) -> Result<(), GalleryError> {
        let mut state = self.state.write();
        let index = state
            .items
            .iter()
            .position(|item| item.id == *id)
            .ok_or(GalleryError::ItemNotFound { id: *id })?;
        let removed = state.items.remove(index);

        match removed.number {
            Some(number) => state.ids.retain(|n| *n != number),
            None => state.uploads.retain(|item| item.id != *id),
        }
        info!(id = %id, label = %removed.label(), "Removed demo image");
        Ok(())
    }

    async fn refresh(&self) -> Result<(), GalleryError> {
        self.state.write().did_fetch = false;
        self.fetch_thumbnails().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageType;

    async fn fetched(ids: Vec<i64>) -> DemoDataSource {
        let source = DemoDataSource::new(ids);
        source.fetch_thumbnails().await.unwrap();
        source
    }

    #[tokio::test]
    async fn test_items_follow_ids() {
        let source = fetched(vec![10, 11, 12]).await;
        let numbers: Vec<_> = source.list_items().iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![Some(10), Some(11), Some(12)]);
        assert_eq!(
            source.list_items()[0].locator,
            Some(DemoDataSource::thumbnail_locator(10))
        );
    }

    #[tokio::test]
    async fn test_fetch_is_skipped_once_done() {
        let source = fetched(vec![1]).await;
        let before = source.list_items();
        source.fetch_thumbnails().await.unwrap();
        assert_eq!(source.list_items(), before);
    }

    #[tokio::test]
    async fn test_refresh_keeps_identities() {
        let source = fetched(vec![1, 2]).await;
        let before = source.list_items();
        source.refresh().await.unwrap();
        assert_eq!(source.list_items(), before);
    }

    #[test]
    fn test_thumbnail_heights_stay_in_range() {
        for number in -50..200 {
            let locator = DemoDataSource::thumbnail_locator(number);
            let height: i64 = locator.as_str().rsplit('/').next().unwrap().parse().unwrap();
            assert!((200..=300).contains(&height));
        }
    }

    #[tokio::test]
    async fn test_original_for_numbered_and_uploaded_items() {
        let source = fetched(vec![5]).await;
        let picked = Locator::new("file:///tmp/cat.jpg");
        source
            .submit_image(PickedImage::new(vec![0_u8], ImageType::Jpeg, picked.clone()))
            .await
            .unwrap();

        let items = source.list_items();
        assert_eq!(
            source.fetch_original(&items[0].id).await.unwrap(),
            Some(DemoDataSource::original_locator(5))
        );
        assert_eq!(source.fetch_original(&items[1].id).await.unwrap(), Some(picked));
    }

    #[tokio::test]
    async fn test_uploads_survive_refresh() {
        let source = fetched(vec![5]).await;
        source
            .submit_image(PickedImage::new(
                vec![0_u8],
                ImageType::Png,
                Locator::new("file:///tmp/a.png"),
            ))
            .await
            .unwrap();

        source.refresh().await.unwrap();
        assert_eq!(source.list_items().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let source = fetched(vec![1, 2]).await;
        let first = source.list_items()[0].id;

        source.remove_item(&first).await.unwrap();
        assert_eq!(source.ids(), vec![2]);

        let err = source.remove_item(&first).await.unwrap_err();
        assert!(matches!(err, GalleryError::ItemNotFound { .. }));

        source.refresh().await.unwrap();
        assert_eq!(source.list_items().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_original() {
        let source = fetched(vec![1]).await;
        let err = source.fetch_original(&ItemId::new()).await.unwrap_err();
        assert!(matches!(err, GalleryError::ItemNotFound { .. }));
    }
}
