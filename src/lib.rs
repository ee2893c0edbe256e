//! # kvtrace
//!
//! An instrumented key-value caching layer for Rust.
//!
//! kvtrace wraps a key-value store (Redis, or the in-process [`MemoryStore`])
//! and adds:
//!
//! - **Unique-key object storage**: [`ObjectCache::store`] picks a random key,
//!   writes the value, hands the key back
//! - **Call instrumentation**: a counter plus input/output history for every
//!   instrumented operation, kept in the store
//! - **Replay**: [`replay`] rebuilds a readable trace from that history
//! - **Expiring fetch cache**: [`ExpiringFetchCache`] serves fetched pages
//!   from the store for a TTL and counts every request per url
//!
//! ## Quick Start
//!
//! ```rust
//! use kvtrace::{CacheConfig, MemoryStore, ObjectCache};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let cache = ObjectCache::new(store, CacheConfig::default()).unwrap();
//!
//! let key = cache.store("hello").unwrap();
//! assert_eq!(cache.get_as_string(&key).unwrap().as_deref(), Some("hello"));
//!
//! // ObjectCache.store was called 1 times:
//! // ObjectCache.store(*("hello",)) -> 1f0c...
//! println!("{}", cache.replay_store().unwrap());
//! ```
//!
//! ## Decoding
//!
//! Reads take an explicit [`Decoder`] instead of an optional callback:
//!
//! ```rust
//! use kvtrace::{CacheConfig, Decoder, MemoryStore, ObjectCache, StoredValue};
//! use std::sync::Arc;
//!
//! let cache = ObjectCache::new(Arc::new(MemoryStore::new()), CacheConfig::default()).unwrap();
//! let key = cache.store(42).unwrap();
//!
//! assert_eq!(cache.get(&key, Decoder::Raw).unwrap(), Some(StoredValue::Bytes(b"42".to_vec())));
//! assert_eq!(cache.get(&key, Decoder::Int).unwrap(), Some(StoredValue::Int(42)));
//! assert_eq!(cache.get("no-such-key", Decoder::Int).unwrap(), None);
//! ```
//!
//! ## Expiring Fetch Cache
//!
//! ```rust
//! use kvtrace::{ExpiringFetchCache, FetchCacheConfig, MemoryStore, Result};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let cache = ExpiringFetchCache::new(
//!     Arc::new(MemoryStore::new()),
//!     |url: &str| -> Result<String> { Ok(format!("<html>{}</html>", url)) },
//!     FetchCacheConfig::default().with_result_ttl(Duration::from_secs(10)),
//! );
//!
//! let body = cache.fetch("http://example.com").unwrap();
//! assert_eq!(cache.fetch("http://example.com").unwrap(), body);
//! assert_eq!(cache.request_count("http://example.com").unwrap(), 2);
//! ```
//!
//! With the `http` feature (on by default), `HttpFetcher` performs real GET
//! requests. With the `redis` feature, `RedisStore` connects to a Redis
//! server.

pub use kvtrace_core::*;

#[cfg(feature = "redis")]
pub use kvtrace_redis::RedisStore;
