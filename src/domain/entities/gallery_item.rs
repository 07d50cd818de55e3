//! Gallery items and picked images.

use bytes::Bytes;

use super::{ImageType, Locator};

/// Stable identity of a gallery item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(uuid::Uuid);

impl ItemId {
    /// Generates a fresh random identity.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item supplied by a gallery data source.
///
/// Owned by the data source; the grid only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Identity used for navigation and deletion.
    pub id: ItemId,
    /// Optional numeric id assigned by the backing store.
    pub number: Option<i64>,
    /// Thumbnail locator. Items without one render as failed cells.
    pub locator: Option<Locator>,
}

impl GalleryItem {
    /// Creates an item with a fresh identity.
    #[must_use]
    pub fn new(number: Option<i64>, locator: Option<Locator>) -> Self {
        Self {
            id: ItemId::new(),
            number,
            locator,
        }
    }

    /// Short label for display.
    #[must_use]
    pub fn label(&self) -> String {
        self.number
            .map_or_else(|| "new".to_string(), |n| format!("#{n}"))
    }
}

/// An image chosen through the photo picker.
#[derive(Clone)]
pub struct PickedImage {
    /// Encoded image bytes as read from the source.
    pub bytes: Bytes,
    /// Encoded format.
    pub kind: ImageType,
    /// Where the image was picked from.
    pub locator: Locator,
}

impl PickedImage {
    /// Creates a picked image.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, kind: ImageType, locator: Locator) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
            locator,
        }
    }
}

impl std::fmt::Debug for PickedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickedImage")
            .field("len", &self.bytes.len())
            .field("kind", &self.kind)
            .field("locator", &self.locator)
            .finish()
    }
}
