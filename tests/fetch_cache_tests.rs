/// Integration tests for the expiring fetch cache
use kvtrace::{
    CacheError, ExpiringFetchCache, FetchCacheConfig, KeyValueStore, ManualClock, MemoryStore,
    PageFetcher, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fetcher that counts network calls and fails for urls containing "down".
#[derive(Default)]
struct FakeNetwork {
    calls: AtomicUsize,
}

impl PageFetcher for FakeNetwork {
    fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("down") {
            return Err(CacheError::Connectivity(format!("{} unreachable", url)));
        }
        Ok(format!("<html>{}</html>", url))
    }
}

fn setup() -> (
    ExpiringFetchCache<MemoryStore, FakeNetwork>,
    Arc<MemoryStore>,
    Arc<ManualClock>,
) {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let cache = ExpiringFetchCache::new(
        store.clone(),
        FakeNetwork::default(),
        FetchCacheConfig::default(),
    );
    (cache, store, clock)
}

#[test]
fn test_two_fetches_within_ttl_then_one_after_expiry() {
    let (cache, _store, clock) = setup();
    let url = "http://x/y";

    let first = cache.fetch(url).unwrap();
    clock.advance(Duration::from_secs(3));
    let second = cache.fetch(url).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(8));
    cache.fetch(url).unwrap();
    assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_counter_is_five_after_five_mixed_calls() {
    let (cache, _store, clock) = setup();
    let url = "http://x/y";

    cache.fetch(url).unwrap();
    cache.fetch(url).unwrap();
    clock.advance(Duration::from_secs(11));
    cache.fetch(url).unwrap();
    cache.fetch(url).unwrap();
    clock.advance(Duration::from_secs(11));
    cache.fetch(url).unwrap();

    assert_eq!(cache.request_count(url).unwrap(), 5);
    assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cached_result_presence_is_observable() {
    let (cache, store, clock) = setup();
    let url = "http://x/y";

    assert!(!store.exists("result:http://x/y").unwrap());
    cache.fetch(url).unwrap();
    assert!(store.exists("result:http://x/y").unwrap());
    assert_eq!(store.get("count:http://x/y").unwrap(), Some(b"1".to_vec()));

    clock.advance(Duration::from_secs(10));
    assert!(!store.exists("result:http://x/y").unwrap());
}

#[test]
fn test_network_failure_propagates_and_keeps_count() {
    let (cache, _store, _clock) = setup();
    let url = "http://down/page";

    let err = cache.fetch(url).unwrap_err();
    assert!(err.is_connectivity());
    assert!(!cache.is_cached(url).unwrap());
    assert_eq!(cache.request_count(url).unwrap(), 1);

    assert!(cache.fetch(url).is_err());
    assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_fetch_cache_and_object_cache_share_a_store() {
    use kvtrace::{CacheConfig, ObjectCache};

    let (fetch_cache, store, _clock) = setup();
    let objects = ObjectCache::new(store, CacheConfig::default()).unwrap();

    let body = fetch_cache.fetch("http://x/y").unwrap();
    let key = objects.store(body.clone()).unwrap();

    assert_eq!(objects.get_as_string(&key).unwrap(), Some(body));
    assert_eq!(objects.replay_store().unwrap().count, 1);
    assert_eq!(fetch_cache.request_count("http://x/y").unwrap(), 1);
}
