use std::time::Duration;

/// Operation name under which [`ObjectCache::store`](crate::ObjectCache::store)
/// records its counter and history.
pub const DEFAULT_STORE_OPERATION: &str = "ObjectCache.store";

/// Default lifetime of a cached fetch result.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(10);

/// Settings for [`ObjectCache`](crate::ObjectCache).
///
/// # Examples
///
/// ```
/// use kvtrace_core::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_flush_on_init(true)
///     .with_store_operation("Cache.store");
///
/// assert!(config.flush_on_init);
/// assert_eq!(config.store_operation, "Cache.store");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Flush the entire store when the cache is constructed.
    ///
    /// This wipes every key, including data written by other processes, and
    /// is not idempotent: a second cache built with this flag erases what
    /// the first one stored. Enable it at most once per process, typically
    /// for test isolation. Defaults to `false`.
    pub flush_on_init: bool,
    /// Name used for the counter and history keys of `store`.
    pub store_operation: String,
}

impl CacheConfig {
    pub fn with_flush_on_init(mut self, flush: bool) -> Self {
        self.flush_on_init = flush;
        self
    }

    pub fn with_store_operation(mut self, name: impl Into<String>) -> Self {
        self.store_operation = name.into();
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            flush_on_init: false,
            store_operation: DEFAULT_STORE_OPERATION.to_string(),
        }
    }
}

/// Settings for [`ExpiringFetchCache`](crate::ExpiringFetchCache).
///
/// `result_ttl` and `counter_ttl` are independent: the body may expire while
/// the request counter keeps counting, or the other way round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCacheConfig {
    /// How long a fetched body is served from the store. Defaults to 10 seconds.
    pub result_ttl: Duration,
    /// Optional lifetime of the per-url request counter, starting at the first
    /// request after the counter was absent. `None` (the default) keeps the
    /// counter forever.
    pub counter_ttl: Option<Duration>,
    /// Prefix of counter keys, `count:` by default.
    pub count_prefix: String,
    /// Prefix of cached body keys, `result:` by default.
    pub result_prefix: String,
}

impl FetchCacheConfig {
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }

    pub fn with_counter_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.counter_ttl = ttl;
        self
    }

    pub fn with_prefixes(mut self, count: impl Into<String>, result: impl Into<String>) -> Self {
        self.count_prefix = count.into();
        self.result_prefix = result.into();
        self
    }

    pub fn count_key(&self, url: &str) -> String {
        format!("{}{}", self.count_prefix, url)
    }

    pub fn result_key(&self, url: &str) -> String {
        format!("{}{}", self.result_prefix, url)
    }
}

impl Default for FetchCacheConfig {
    fn default() -> Self {
        Self {
            result_ttl: DEFAULT_RESULT_TTL,
            counter_ttl: None,
            count_prefix: "count:".to_string(),
            result_prefix: "result:".to_string(),
        }
    }
}
