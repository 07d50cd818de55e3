//! In-memory LRU image cache implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::{ImagePayload, Locator};
use crate::domain::ports::ImageCachePort;

/// Default byte budget for decoded thumbnails.
pub const DEFAULT_CACHE_BYTES: usize = 64 * 1024 * 1024;

/// Capacity bounds of a [`MemoryImageCache`].
///
/// Both bounds apply; `max_entries` is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheCapacity {
    /// Maximum total size of all entries in bytes.
    pub max_bytes: usize,
    /// Maximum number of entries.
    pub max_entries: Option<usize>,
}

impl CacheCapacity {
    /// Bounds the cache by total size only.
    #[must_use]
    pub const fn bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            max_entries: None,
        }
    }

    /// Bounds the cache by entry count only.
    #[must_use]
    pub const fn entries(max_entries: usize) -> Self {
        Self {
            max_bytes: usize::MAX,
            max_entries: Some(max_entries),
        }
    }

    fn exceeded_by(&self, bytes: usize, entries: usize) -> bool {
        bytes > self.max_bytes || self.max_entries.is_some_and(|max| entries > max)
    }

    fn admits(&self, size_bytes: usize) -> bool {
        size_bytes <= self.max_bytes && self.max_entries != Some(0)
    }
}

impl Default for CacheCapacity {
    fn default() -> Self {
        Self::bytes(DEFAULT_CACHE_BYTES)
    }
}

struct CacheEntry {
    payload: ImagePayload,
    size_bytes: usize,
    last_access: Instant,
}

struct CacheTable {
    entries: LruCache<Locator, CacheEntry>,
    total_bytes: usize,
}

/// In-memory LRU cache for decoded images.
///
/// Thread-safe; every operation takes one short-lived lock.
pub struct MemoryImageCache {
    table: Mutex<CacheTable>,
    capacity: CacheCapacity,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            table: Mutex::new(CacheTable {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            }),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(CacheCapacity::default())
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> CacheCapacity {
        self.capacity
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let table = self.table.lock();
        CacheStats {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
            entries: table.entries.len(),
            bytes: table.total_bytes,
        }
    }

    /// Peeks at an image without promoting it in the LRU.
    #[must_use]
    pub fn peek(&self, locator: &Locator) -> Option<ImagePayload> {
        let table = self.table.lock();
        table.entries.peek(locator).map(|entry| entry.payload.clone())
    }

    /// Returns true if `locator` is cached, without promoting it.
    #[must_use]
    pub fn contains(&self, locator: &Locator) -> bool {
        self.table.lock().entries.contains(locator)
    }

    /// Returns when `locator` was last read or written.
    #[must_use]
    pub fn last_access(&self, locator: &Locator) -> Option<Instant> {
        let table = self.table.lock();
        table.entries.peek(locator).map(|entry| entry.last_access)
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted to satisfy the capacity.
    pub evictions: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub entries: usize,
    /// Current tracked size in bytes.
    pub bytes: usize,
}

impl std::fmt::Display for CacheStats {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1} MiB, {:.1}% hit rate ({} hits, {} misses, {} evicted)",
            self.entries,
            self.bytes as f64 / (1024.0 * 1024.0),
            self.hit_rate,
            self.hits,
            self.misses,
            self.evictions
        )
    }
}

impl ImageCachePort for MemoryImageCache {
    fn get(&self, locator: &Locator) -> Option<ImagePayload> {
        let mut table = self.table.lock();
        if let Some(entry) = table.entries.get_mut(locator) {
            entry.last_access = Instant::now();
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(locator = %locator, "Memory cache hit");
            Some(entry.payload.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(locator = %locator, "Memory cache miss");
            None
        }
    }

    fn put(&self, locator: Locator, payload: ImagePayload, size_bytes: usize) {
        let mut table = self.table.lock();

        if let Some(previous) = table.entries.pop(&locator) {
            table.total_bytes -= previous.size_bytes;
        }

        if !self.capacity.admits(size_bytes) {
            warn!(
                locator = %locator,
                size_bytes,
                max_bytes = self.capacity.max_bytes,
                "Image larger than cache capacity, not caching"
            );
            return;
        }

        debug!(locator = %locator, size_bytes, "Storing image in memory cache");
        table.entries.push(
            locator,
            CacheEntry {
                payload,
                size_bytes,
                last_access: Instant::now(),
            },
        );
        table.total_bytes += size_bytes;

        while table.entries.len() > 1
            && self
                .capacity
                .exceeded_by(table.total_bytes, table.entries.len())
        {
            let Some((evicted, entry)) = table.entries.pop_lru() else {
                break;
            };
            table.total_bytes -= entry.size_bytes;
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(locator = %evicted, size_bytes = entry.size_bytes, "Evicted image from memory cache");
        }
    }

    fn invalidate(&self, locator: &Locator) {
        let mut table = self.table.lock();
        if let Some(entry) = table.entries.pop(locator) {
            table.total_bytes -= entry.size_bytes;
            debug!(locator = %locator, "Invalidated image in memory cache");
        }
    }

    fn clear(&self) {
        let mut table = self.table.lock();
        table.entries.clear();
        table.total_bytes = 0;
        debug!("Cleared memory image cache");
    }

    fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    fn total_bytes(&self) -> usize {
        self.table.lock().total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::payload;

    fn put_sized(cache: &MemoryImageCache, key: &str, size: usize) -> ImagePayload {
        let img = payload(4, 4);
        cache.put(Locator::new(key), img.clone(), size);
        img
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(10));
        let img = put_sized(&cache, "a", 10);

        let retrieved = cache.get(&Locator::new("a"));
        assert!(retrieved.is_some_and(|p| p.same_as(&img)));
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryImageCache::default();
        assert!(cache.get(&Locator::new("nonexistent")).is_none());
    }

    #[test]
    fn test_get_touch_changes_eviction_victim() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(2));
        put_sized(&cache, "a", 1);
        put_sized(&cache, "b", 1);

        assert!(cache.get(&Locator::new("a")).is_some());
        put_sized(&cache, "c", 1);

        assert!(cache.get(&Locator::new("b")).is_none());
        assert!(cache.get(&Locator::new("a")).is_some());
        assert!(cache.get(&Locator::new("c")).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_oldest_evicted_without_touch() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(2));
        put_sized(&cache, "a", 1);
        put_sized(&cache, "b", 1);
        put_sized(&cache, "c", 1);

        assert!(cache.peek(&Locator::new("a")).is_none());
        assert!(cache.contains(&Locator::new("b")));
        assert!(cache.contains(&Locator::new("c")));
    }

    #[test]
    fn test_byte_bound_never_exceeded() {
        let cache = MemoryImageCache::new(CacheCapacity::bytes(100));
        for (i, size) in [40, 30, 50, 20, 90, 10].into_iter().enumerate() {
            put_sized(&cache, &format!("img{i}"), size);
            assert!(cache.total_bytes() <= 100, "bound exceeded after put {i}");
        }
        assert_eq!(cache.total_bytes(), 100);
        assert!(cache.contains(&Locator::new("img4")));
        assert!(cache.contains(&Locator::new("img5")));
    }

    #[test]
    fn test_large_put_evicts_several() {
        let cache = MemoryImageCache::new(CacheCapacity::bytes(100));
        put_sized(&cache, "a", 30);
        put_sized(&cache, "b", 30);
        put_sized(&cache, "c", 30);
        put_sized(&cache, "d", 80);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 80);
        assert_eq!(cache.stats().evictions, 3);
    }

    #[test]
    fn test_oversized_entry_is_not_cached() {
        let cache = MemoryImageCache::new(CacheCapacity::bytes(100));
        put_sized(&cache, "a", 50);
        put_sized(&cache, "huge", 101);

        assert!(!cache.contains(&Locator::new("huge")));
        assert!(cache.contains(&Locator::new("a")));
        assert_eq!(cache.total_bytes(), 50);
    }

    #[test]
    fn test_replace_updates_size() {
        let cache = MemoryImageCache::new(CacheCapacity::bytes(100));
        put_sized(&cache, "a", 60);
        let newer = put_sized(&cache, "a", 20);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 20);
        assert!(cache.get(&Locator::new("a")).is_some_and(|p| p.same_as(&newer)));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(10));
        put_sized(&cache, "a", 5);
        put_sized(&cache, "b", 7);

        cache.invalidate(&Locator::new("a"));
        cache.invalidate(&Locator::new("missing"));
        assert!(cache.get(&Locator::new("a")).is_none());
        assert_eq!(cache.total_bytes(), 7);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_bytes(), 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(10));
        put_sized(&cache, "a", 8);

        let _ = cache.get(&Locator::new("a"));
        let _ = cache.get(&Locator::new("missing"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.bytes, 8);
        assert!(stats.to_string().contains("50.0% hit rate"));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(2));
        put_sized(&cache, "a", 1);
        put_sized(&cache, "b", 1);

        let _ = cache.peek(&Locator::new("a"));
        put_sized(&cache, "c", 1);

        assert!(cache.peek(&Locator::new("a")).is_none());
    }

    #[test]
    fn test_get_refreshes_last_access() {
        let cache = MemoryImageCache::new(CacheCapacity::entries(2));
        put_sized(&cache, "a", 1);
        let stored = cache.last_access(&Locator::new("a"));
        let _ = cache.get(&Locator::new("a"));
        let touched = cache.last_access(&Locator::new("a"));
        assert!(stored.is_some() && touched >= stored);
    }
}
