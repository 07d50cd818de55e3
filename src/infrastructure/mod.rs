//! Infrastructure layer with configuration, image fetching and caching, and
//! gallery adapters.

/// Application configuration.
pub mod config;
/// Demo gallery data source.
pub mod demo;
/// Image caching, loading and fetching.
pub mod image;
/// Native photo picker.
pub mod picker;

pub use self::image::{
    CacheCapacity, CacheStats, HttpImageFetcher, ImageLoader, ImageLoaderConfig, LoadTicket,
    MemoryImageCache, PendingLoad, SubscriberToken, TimeoutFetcher,
};
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use demo::DemoDataSource;
pub use picker::NativePhotoPicker;
