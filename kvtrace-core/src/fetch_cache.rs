use crate::value::{decode_int, decode_utf8};
use crate::{FetchCacheConfig, KeyValueStore, PageFetcher, Result};
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "stats")]
use crate::FetchStats;

/// Read-through cache for fetched pages with a per-url request counter.
///
/// Every [`fetch`](Self::fetch) increments `count:<url>`, hit or miss. A body
/// cached at `result:<url>` is served until its TTL runs out; after that the
/// next request goes to the fetcher and starts a fresh TTL window. Failed
/// fetches are never cached and leave the counter increment in place.
///
/// Counter and body live in the store, so caches in several processes over
/// the same store share both. Two concurrent misses for the same url may both
/// reach the fetcher; the later write wins.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{ExpiringFetchCache, FetchCacheConfig, ManualClock, MemoryStore, Result};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let store = Arc::new(MemoryStore::with_clock(clock.clone()));
/// let calls = Arc::new(AtomicUsize::new(0));
///
/// let counter = calls.clone();
/// let fetcher = move |url: &str| -> Result<String> {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(format!("body of {}", url))
/// };
/// let cache = ExpiringFetchCache::new(store, fetcher, FetchCacheConfig::default());
///
/// cache.fetch("http://x/y").unwrap();
/// cache.fetch("http://x/y").unwrap();
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
///
/// clock.advance(Duration::from_secs(11));
/// cache.fetch("http://x/y").unwrap();
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// assert_eq!(cache.request_count("http://x/y").unwrap(), 3);
/// ```
pub struct ExpiringFetchCache<S: KeyValueStore + ?Sized, F> {
    store: Arc<S>,
    fetcher: F,
    config: FetchCacheConfig,
    #[cfg(feature = "stats")]
    stats: FetchStats,
}

impl<S, F> ExpiringFetchCache<S, F>
where
    S: KeyValueStore + ?Sized,
    F: PageFetcher,
{
    pub fn new(store: Arc<S>, fetcher: F, config: FetchCacheConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
            #[cfg(feature = "stats")]
            stats: FetchStats::new(),
        }
    }

    /// Returns the body of `url`, from the store when a live copy exists,
    /// otherwise from the fetcher.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let count_key = self.config.count_key(url);
        let result_key = self.config.result_key(url);

        let requests = self.store.incr(&count_key)?;
        if requests == 1 {
            if let Some(ttl) = self.config.counter_ttl {
                self.store.expire(&count_key, ttl)?;
            }
        }

        if let Some(cached) = self.store.get(&result_key)? {
            debug!(url, requests, "fetch cache hit");
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return decode_utf8(cached);
        }

        debug!(url, requests, "fetch cache miss");
        #[cfg(feature = "stats")]
        self.stats.record_miss();

        let body = match self.fetcher.fetch(url) {
            Ok(body) => body,
            Err(err) => {
                warn!(url, error = %err, "fetch failed, nothing cached");
                #[cfg(feature = "stats")]
                self.stats.record_failure();
                return Err(err);
            }
        };

        self.store
            .set_with_expiry(&result_key, body.as_bytes(), self.config.result_ttl)?;
        Ok(body)
    }

    /// Number of requests made for `url`, 0 if never requested (or the
    /// counter expired).
    pub fn request_count(&self, url: &str) -> Result<i64> {
        match self.store.get(&self.config.count_key(url))? {
            Some(bytes) => decode_int(&bytes),
            None => Ok(0),
        }
    }

    /// Whether a live body for `url` is in the store.
    pub fn is_cached(&self, url: &str) -> Result<bool> {
        self.store.exists(&self.config.result_key(url))
    }

    pub fn config(&self) -> &FetchCacheConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }
}
