//! Port definitions for image caching and fetching.

use std::future::Future;

use crate::domain::entities::{ImagePayload, Locator};
use crate::domain::errors::LoadError;

/// Result type for image loads.
pub type LoadResult<T = ImagePayload> = std::result::Result<T, LoadError>;

/// Port for in-memory image caching.
///
/// Implementations must be thread-safe. Operations never perform I/O.
pub trait ImageCachePort: Send + Sync {
    /// Returns the cached payload and marks it recently used.
    fn get(&self, locator: &Locator) -> Option<ImagePayload>;

    /// Inserts or replaces an entry, evicting least recently used entries
    /// until the cache is back within its capacity.
    fn put(&self, locator: Locator, payload: ImagePayload, size_bytes: usize);

    /// Removes a single entry if present.
    fn invalidate(&self, locator: &Locator);

    /// Removes every entry.
    fn clear(&self);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the tracked size of all entries in bytes.
    fn total_bytes(&self) -> usize;
}

/// Port for fetching an image from its source.
///
/// This is the pluggable boundary under the loader, typically an HTTP GET
/// followed by a decode.
#[async_trait::async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Fetches and decodes the image behind `locator`.
    async fn fetch(&self, locator: &Locator) -> LoadResult;
}

/// Adapts an async closure into an [`ImageFetcherPort`].
pub struct FetchFn<F>(F);

impl<F> FetchFn<F> {
    /// Wraps the closure.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F, Fut> ImageFetcherPort for FetchFn<F>
where
    F: Fn(Locator) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LoadResult> + Send + 'static,
{
    async fn fetch(&self, locator: &Locator) -> LoadResult {
        (self.0)(locator.clone()).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    use crate::domain::entities::ImageType;

    /// Creates a small solid payload for tests.
    pub fn payload(width: u32, height: u32) -> ImagePayload {
        ImagePayload::new(image::DynamicImage::new_rgb8(width, height), ImageType::Png)
    }

    /// Fetcher that counts calls, can be held at a gate and can be told to
    /// fail for particular locators.
    pub struct MockFetcher {
        calls: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
        failures: Mutex<Vec<(Locator, LoadError)>>,
        size: (u32, u32),
    }

    impl MockFetcher {
        /// Creates a fetcher that resolves immediately.
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: None,
                failures: Mutex::new(Vec::new()),
                size: (8, 8),
            }
        }

        /// Creates a fetcher that waits for a permit on `gate` per fetch.
        pub fn gated(gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        /// Sets the dimensions of produced payloads.
        pub fn with_size(mut self, width: u32, height: u32) -> Self {
            self.size = (width, height);
            self
        }

        /// Makes every fetch of `locator` fail with `error`.
        pub fn fail(&self, locator: impl Into<Locator>, error: LoadError) {
            self.failures.lock().push((locator.into(), error));
        }

        /// Makes fetches of `locator` succeed again.
        pub fn heal(&self, locator: &Locator) {
            self.failures.lock().retain(|(l, _)| l != locator);
        }

        /// Number of fetches started.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait::async_trait]
    impl ImageFetcherPort for MockFetcher {
        async fn fetch(&self, locator: &Locator) -> LoadResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|_| LoadError::Cancelled)?
                    .forget();
            }
            let failure = self
                .failures
                .lock()
                .iter()
                .find(|(l, _)| l == locator)
                .map(|(_, e)| e.clone());
            match failure {
                Some(error) => Err(error),
                None => Ok(payload(self.size.0, self.size.1)),
            }
        }
    }
}
