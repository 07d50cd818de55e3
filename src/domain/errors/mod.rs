//! Domain error types.

mod gallery_error;
mod load_error;
mod picker_error;

pub use gallery_error::GalleryError;
pub use load_error::LoadError;
pub use picker_error::PickerError;
