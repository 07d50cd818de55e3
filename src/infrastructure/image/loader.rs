//! Async image loading orchestrator.
//!
//! Resolves from the memory cache when possible, otherwise runs at most one
//! fetch per locator and fans its outcome out to every waiting subscriber.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Semaphore, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{ImagePayload, Locator};
use crate::domain::errors::LoadError;
use crate::domain::ports::{ImageCachePort, ImageFetcherPort, LoadResult};

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum fetches running at the same time.
    pub max_concurrent_fetches: usize,
    /// Abort a fetch once its last subscriber cancels. When false the fetch
    /// runs to completion and still populates the cache.
    pub abort_unsubscribed: bool,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            abort_unsubscribed: false,
        }
    }
}

/// Identifies one waiter on an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberToken(u64);

/// Outcome of starting a load.
#[derive(Debug)]
pub enum LoadTicket {
    /// The image was already cached.
    Ready(ImagePayload),
    /// The caller was attached to an in-flight fetch.
    Pending(PendingLoad),
}

impl LoadTicket {
    /// Returns the subscriber token of a pending load.
    #[must_use]
    pub const fn token(&self) -> Option<SubscriberToken> {
        match self {
            Self::Ready(_) => None,
            Self::Pending(pending) => Some(pending.token),
        }
    }

    /// Waits for the terminal result.
    ///
    /// # Errors
    /// Returns the fetch failure, or [`LoadError::Cancelled`] if this
    /// subscriber was cancelled.
    pub async fn wait(self) -> LoadResult {
        match self {
            Self::Ready(payload) => Ok(payload),
            Self::Pending(pending) => pending.wait().await,
        }
    }
}

/// A subscription to an in-flight fetch.
#[derive(Debug)]
pub struct PendingLoad {
    locator: Locator,
    token: SubscriberToken,
    rx: oneshot::Receiver<LoadResult>,
}

impl PendingLoad {
    /// Locator being loaded.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Token to pass to [`ImageLoader::cancel`].
    #[must_use]
    pub const fn token(&self) -> SubscriberToken {
        self.token
    }

    /// Waits for the terminal result.
    ///
    /// # Errors
    /// Returns the fetch failure, or [`LoadError::Cancelled`] if this
    /// subscriber was cancelled.
    pub async fn wait(self) -> LoadResult {
        self.rx.await.unwrap_or(Err(LoadError::Cancelled))
    }
}

struct InFlightRequest {
    id: u64,
    subscribers: HashMap<SubscriberToken, oneshot::Sender<LoadResult>>,
    task: Option<AbortHandle>,
}

struct LoaderInner {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetcherPort>,
    in_flight: Mutex<HashMap<Locator, InFlightRequest>>,
    permits: Arc<Semaphore>,
    next_id: AtomicU64,
    fetches_started: AtomicU64,
    config: ImageLoaderConfig,
}

/// De-duplicating, cache-backed image loader.
///
/// Cheap to clone; clones share the cache and in-flight table.
#[derive(Clone)]
pub struct ImageLoader {
    inner: Arc<LoaderInner>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.inner.config)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a new image loader.
    #[must_use]
    pub fn new(
        config: ImageLoaderConfig,
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ImageFetcherPort>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1)));
        Self {
            inner: Arc::new(LoaderInner {
                cache,
                fetcher,
                in_flight: Mutex::new(HashMap::new()),
                permits,
                next_id: AtomicU64::new(1),
                fetches_started: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Loads an image, from cache if present, otherwise by joining or
    /// starting a fetch.
    ///
    /// # Errors
    /// Returns the fetch failure shared by every subscriber of the fetch.
    pub async fn load(&self, locator: &Locator) -> LoadResult {
        self.begin(locator).wait().await
    }

    /// Starts a load without waiting for it.
    ///
    /// Must be called from within a Tokio runtime when the image is not
    /// cached, since a miss spawns the fetch task.
    #[must_use]
    pub fn begin(&self, locator: &Locator) -> LoadTicket {
        let mut table = self.inner.in_flight.lock();

        if let Some(payload) = self.inner.cache.get(locator) {
            return LoadTicket::Ready(payload);
        }

        let token = SubscriberToken(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();

        if let Some(request) = table.get_mut(locator) {
            request.subscribers.insert(token, tx);
            trace!(
                locator = %locator,
                subscribers = request.subscribers.len(),
                "Joined in-flight image fetch"
            );
        } else {
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let mut request = InFlightRequest {
                id,
                subscribers: HashMap::from([(token, tx)]),
                task: None,
            };
            request.task = Some(self.spawn_fetch(locator.clone(), id));
            table.insert(locator.clone(), request);
        }

        LoadTicket::Pending(PendingLoad {
            locator: locator.clone(),
            token,
            rx,
        })
    }

    fn spawn_fetch(&self, locator: Locator, id: u64) -> AbortHandle {
        self.inner.fetches_started.fetch_add(1, Ordering::Relaxed);
        debug!(locator = %locator, "Starting image fetch");

        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let mut guard = SettleGuard {
                inner,
                locator,
                id,
                armed: true,
            };
            let result = {
                let _permit = guard.inner.permits.clone().acquire_owned().await;
                guard.inner.fetcher.fetch(&guard.locator).await
            };
            guard.complete(result);
        })
        .abort_handle()
    }

    /// Removes one subscriber from the in-flight request for `locator`.
    ///
    /// The subscriber's waiter resolves to [`LoadError::Cancelled`]. Returns
    /// false if the subscriber was not attached.
    pub fn cancel(&self, locator: &Locator, token: SubscriberToken) -> bool {
        let aborted = {
            let mut table = self.inner.in_flight.lock();
            let Some(request) = table.get_mut(locator) else {
                return false;
            };
            if request.subscribers.remove(&token).is_none() {
                return false;
            }
            trace!(locator = %locator, remaining = request.subscribers.len(), "Cancelled image subscriber");

            if request.subscribers.is_empty() && self.inner.config.abort_unsubscribed {
                table.remove(locator).and_then(|request| request.task)
            } else {
                None
            }
        };

        if let Some(task) = aborted {
            debug!(locator = %locator, "Aborting unsubscribed image fetch");
            task.abort();
        }
        true
    }

    /// Returns true if a fetch for `locator` is outstanding.
    #[must_use]
    pub fn is_loading(&self, locator: &Locator) -> bool {
        self.inner.in_flight.lock().contains_key(locator)
    }

    /// Returns the number of outstanding fetches.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Returns how many underlying fetches have been started.
    #[must_use]
    pub fn fetches_started(&self) -> u64 {
        self.inner.fetches_started.load(Ordering::Relaxed)
    }

    /// Returns the backing cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ImageCachePort> {
        &self.inner.cache
    }

    /// Drops every cached image, e.g. on memory pressure.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        info!("Cleared image cache");
    }
}

impl LoaderInner {
    fn settle(&self, locator: &Locator, id: u64, result: LoadResult) {
        let subscribers = {
            let mut table = self.in_flight.lock();
            if table.get(locator).is_none_or(|request| request.id != id) {
                trace!(locator = %locator, "Fetch settled after its request was dropped");
                return;
            }
            if let Ok(payload) = &result {
                self.cache
                    .put(locator.clone(), payload.clone(), payload.size_bytes());
            }
            table
                .remove(locator)
                .map(|request| request.subscribers)
                .unwrap_or_default()
        };

        match &result {
            Ok(_) => debug!(locator = %locator, subscribers = subscribers.len(), "Image fetch succeeded"),
            Err(e) => warn!(locator = %locator, subscribers = subscribers.len(), error = %e, "Image fetch failed"),
        }

        for (_, tx) in subscribers {
            let _ = tx.send(result.clone());
        }
    }
}

/// Tears the in-flight request down even if the fetch task is aborted or
/// panics, so later loads start a fresh fetch.
struct SettleGuard {
    inner: Arc<LoaderInner>,
    locator: Locator,
    id: u64,
    armed: bool,
}

impl SettleGuard {
    fn complete(&mut self, result: LoadResult) {
        self.armed = false;
        self.inner.settle(&self.locator, self.id, result);
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.armed {
            self.inner
                .settle(&self.locator, self.id, Err(LoadError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio_test::{assert_pending, assert_ready};

    use crate::domain::ports::mocks::MockFetcher;
    use crate::infrastructure::image::memory_cache::{CacheCapacity, MemoryImageCache};

    fn loader_with(fetcher: Arc<MockFetcher>, config: ImageLoaderConfig) -> ImageLoader {
        let cache = Arc::new(MemoryImageCache::new(CacheCapacity::entries(16)));
        ImageLoader::new(config, cache, fetcher)
    }

    async fn settle_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());
        let x = Locator::new("x");

        let a = loader.begin(&x);
        let b = loader.begin(&x);
        let c = loader.begin(&x);
        assert!(a.token().is_some() && b.token().is_some() && c.token().is_some());
        assert_eq!(loader.fetches_started(), 1);
        assert_eq!(loader.pending_count(), 1);

        gate.add_permits(1);
        let (a, b, c) = tokio::join!(a.wait(), b.wait(), c.wait());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(fetcher.calls(), 1);
        assert!(a.same_as(&b) && b.same_as(&c));
        assert!(!loader.is_loading(&x));
    }

    #[tokio::test]
    async fn test_cached_load_returns_ready() {
        let fetcher = Arc::new(MockFetcher::new());
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());
        let x = Locator::new("x");

        let first = loader.load(&x).await.unwrap();
        let ticket = loader.begin(&x);

        assert!(matches!(&ticket, LoadTicket::Ready(p) if p.same_as(&first)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_reaches_all_subscribers_and_is_not_cached() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let y = Locator::new("y");
        fetcher.fail("y", LoadError::network("offline"));
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());

        let a = loader.begin(&y);
        let b = loader.begin(&y);
        gate.add_permits(1);
        let (a, b) = tokio::join!(a.wait(), b.wait());

        assert_eq!(a.unwrap_err(), LoadError::network("offline"));
        assert_eq!(b.unwrap_err(), LoadError::network("offline"));
        assert!(!loader.is_loading(&y));
        assert!(loader.cache().get(&y).is_none());

        fetcher.heal(&y);
        gate.add_permits(1);
        assert!(loader.load(&y).await.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_network_failure_fetches_again() {
        let fetcher = Arc::new(MockFetcher::new());
        let y = Locator::new("y");
        fetcher.fail("y", LoadError::network("unreachable"));
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());

        assert!(loader.load(&y).await.unwrap_err().is_network_error());
        assert!(loader.load(&y).await.unwrap_err().is_network_error());
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(loader.fetches_started(), 2);
    }

    #[tokio::test]
    async fn test_evicted_entry_is_fetched_again() {
        let fetcher = Arc::new(MockFetcher::new());
        let cache = Arc::new(MemoryImageCache::new(CacheCapacity::entries(1)));
        let loader = ImageLoader::new(ImageLoaderConfig::default(), cache, fetcher.clone());

        loader.load(&Locator::new("a")).await.unwrap();
        loader.load(&Locator::new("b")).await.unwrap();
        loader.load(&Locator::new("a")).await.unwrap();

        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_cancel_resolves_waiter_as_cancelled() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());
        let x = Locator::new("x");

        let LoadTicket::Pending(cancelled) = loader.begin(&x) else {
            panic!("expected pending load");
        };
        let kept = loader.begin(&x);

        assert!(loader.cancel(&x, cancelled.token()));
        assert!(!loader.cancel(&x, cancelled.token()));
        assert_eq!(cancelled.wait().await.unwrap_err(), LoadError::Cancelled);

        gate.add_permits(1);
        assert!(kept.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_unsubscribed_fetch_still_populates_cache() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());
        let x = Locator::new("x");

        let ticket = loader.begin(&x);
        let token = ticket.token().unwrap();
        assert!(loader.cancel(&x, token));
        assert!(loader.is_loading(&x));

        gate.add_permits(1);
        for _ in 0..50 {
            if !loader.is_loading(&x) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(loader.cache().get(&x).is_some());
        assert!(matches!(loader.begin(&x), LoadTicket::Ready(_)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_abort_unsubscribed_tears_request_down() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let config = ImageLoaderConfig {
            abort_unsubscribed: true,
            ..ImageLoaderConfig::default()
        };
        let loader = loader_with(fetcher.clone(), config);
        let x = Locator::new("x");

        let ticket = loader.begin(&x);
        settle_tasks().await;
        assert!(loader.cancel(&x, ticket.token().unwrap()));
        assert!(!loader.is_loading(&x));

        gate.add_permits(1);
        let next = loader.load(&x).await;
        assert!(next.is_ok());
        assert_eq!(loader.fetches_started(), 2);
    }

    #[tokio::test]
    async fn test_pending_wait_stays_pending_until_settled() {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let loader = loader_with(fetcher, ImageLoaderConfig::default());

        let mut wait = tokio_test::task::spawn(loader.begin(&Locator::new("x")).wait());
        settle_tasks().await;
        assert_pending!(wait.poll());

        gate.add_permits(1);
        for _ in 0..50 {
            if wait.is_woken() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(assert_ready!(wait.poll()).is_ok());
    }

    #[tokio::test]
    async fn test_different_locators_fetch_independently() {
        let fetcher = Arc::new(MockFetcher::new());
        let loader = loader_with(fetcher.clone(), ImageLoaderConfig::default());

        let (first, second) = (Locator::new("a"), Locator::new("b"));
        let (a, b) = tokio::join!(loader.load(&first), loader.load(&second));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(loader.cache().len(), 2);
    }
}
