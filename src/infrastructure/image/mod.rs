//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with size-bounded LRU eviction
//! - A de-duplicating async loader on top of the cache
//! - HTTP/file fetching with decode and downscale
//! - A deadline wrapper for any fetcher

pub mod http_fetcher;
pub mod loader;
pub mod memory_cache;
pub mod timeout_fetcher;

pub use http_fetcher::HttpImageFetcher;
pub use loader::{ImageLoader, ImageLoaderConfig, LoadTicket, PendingLoad, SubscriberToken};
pub use memory_cache::{CacheCapacity, CacheStats, MemoryImageCache};
pub use timeout_fetcher::TimeoutFetcher;
