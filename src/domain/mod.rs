//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{GalleryItem, ImagePayload, ImageType, ItemId, Locator, PickedImage};
pub use errors::{GalleryError, LoadError, PickerError};
pub use ports::{GalleryDataSource, ImageCachePort, ImageFetcherPort, PhotoPickerPort};
