mod gallery_data_source_port;
mod image_cache_port;
mod photo_picker_port;

pub use gallery_data_source_port::GalleryDataSource;
pub use image_cache_port::{FetchFn, ImageCachePort, ImageFetcherPort, LoadResult};
pub use photo_picker_port::PhotoPickerPort;
