//! Domain entity definitions.

mod gallery_item;
mod image_payload;
mod locator;

pub use gallery_item::{GalleryItem, ItemId, PickedImage};
pub use image_payload::{ImagePayload, ImageType};
pub use locator::Locator;
