use std::sync::atomic::{AtomicU64, Ordering};

/// In-process counters for one [`ExpiringFetchCache`](crate::ExpiringFetchCache).
///
/// These are local to the cache instance and reset with it. The shared,
/// cross-process request count is the per-url counter kept in the store; this
/// struct only tells how *this* instance was served.
///
/// # Examples
///
/// ```
/// use kvtrace_core::FetchStats;
///
/// let stats = FetchStats::new();
///
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.total_requests(), 3);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct FetchStats {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Records a request answered from the cached body.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a request that had to go to the network.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a network fetch that failed. Failures are also misses.
    #[inline]
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Hits plus misses.
    #[inline]
    pub fn total_requests(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Fraction of requests served from the store, 0.0 with no requests.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

impl Default for FetchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FetchStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            failures: AtomicU64::new(self.failures()),
        }
    }
}
