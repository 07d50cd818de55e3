//! Deadline wrapper around any image fetcher.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::entities::Locator;
use crate::domain::errors::LoadError;
use crate::domain::ports::{ImageFetcherPort, LoadResult};

/// Fails a fetch with [`LoadError::NetworkUnavailable`] once `timeout`
/// elapses.
pub struct TimeoutFetcher {
    inner: Arc<dyn ImageFetcherPort>,
    timeout: Duration,
}

impl TimeoutFetcher {
    /// Wraps `inner` with a deadline.
    #[must_use]
    pub fn new(inner: Arc<dyn ImageFetcherPort>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for TimeoutFetcher {
    async fn fetch(&self, locator: &Locator) -> LoadResult {
        tokio::time::timeout(self.timeout, self.inner.fetch(locator))
            .await
            .unwrap_or_else(|_| {
                warn!(locator = %locator, timeout = ?self.timeout, "Image fetch timed out");
                Err(LoadError::network(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )))
            })
    }
}
