//! # kvtrace Core
//!
//! Building blocks of kvtrace: an instrumented key-value caching layer over a
//! remote key-value store.
//!
//! ## Features
//!
//! - **Object cache**: store values under random unique keys, read them back
//!   raw or through an explicit [`Decoder`]
//! - **Instrumentation**: per-operation call counters and input/output
//!   history, kept in the store and shared by every process using it
//! - **Replay**: turn recorded history back into a readable trace
//! - **Expiring fetch cache**: TTL-bounded page cache with per-url request
//!   counters
//! - **Pluggable stores**: anything implementing [`KeyValueStore`]; an
//!   in-process [`MemoryStore`] ships here, Redis lives in `kvtrace-redis`
//!
//! ## Module Organization
//!
//! - [`store`] - the [`KeyValueStore`] command set
//! - [`instrument`] - call counting and call history interceptors
//! - [`fetch`] - page fetchers for the fetch cache
//!
//! All state lives in the injected store handle. There are no process-wide
//! singletons: build the store once, wrap it in an `Arc`, hand it to every
//! cache that needs it.
//!
//! ```
//! use kvtrace_core::{CacheConfig, MemoryStore, ObjectCache};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let cache = ObjectCache::new(store, CacheConfig::default()).unwrap();
//!
//! cache.store("foo").unwrap();
//! cache.store(42).unwrap();
//!
//! let history = cache.replay_store().unwrap();
//! assert_eq!(history.lines().len(), 3);
//! assert_eq!(history.lines()[0], "ObjectCache.store was called 2 times:");
//! ```
mod clock;
mod config;
mod error;
mod fetch_cache;
mod memory_store;
mod object_cache;
mod replay;
mod store_entry;
mod value;

pub mod fetch;
pub mod instrument;
pub mod store;

#[cfg(feature = "stats")]
mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, FetchCacheConfig, DEFAULT_RESULT_TTL, DEFAULT_STORE_OPERATION};
pub use error::{CacheError, Result};
pub use fetch::PageFetcher;
pub use fetch_cache::ExpiringFetchCache;
pub use instrument::{call_history, count_calls, instrument, OperationKeys};
pub use memory_store::{MemoryStore, SWEEP_INTERVAL};
pub use object_cache::ObjectCache;
pub use replay::{replay, CallRecord, Replay};
pub use store::KeyValueStore;
pub use store_entry::{StoreEntry, StoredData};
pub use value::{DecodeFn, Decoder, Key, StoredValue};

#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

#[cfg(feature = "stats")]
pub use stats::FetchStats;
