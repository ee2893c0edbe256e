//! # Key-Value Store
//!
//! The primitive command set kvtrace needs from a backing store.
//!
//! Every method is a single command and is expected to be atomic on its own.
//! Nothing here is transactional: a caller that issues `incr` and later `get`
//! may observe other writers in between. Implementations are shared between
//! threads, so they take `&self` and must be `Send + Sync`.

use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Commands consumed from a remote key-value store.
///
/// Values are raw bytes. Lists are addressed with the same index rules as
/// Redis `LRANGE`: indices are inclusive and negative indices count from the
/// end, so `lrange(key, 0, -1)` reads the whole list.
pub trait KeyValueStore: Send + Sync {
    /// Reads a scalar value, `None` if the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a scalar value, replacing whatever the key held and clearing
    /// any expiry.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Writes a scalar value that disappears after `ttl`.
    ///
    /// A zero `ttl` removes the key instead of writing it. A `ttl` too large
    /// for the backend to represent leaves the value effectively permanent.
    fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Increments the integer stored at `key` by one and returns the new
    /// value. An absent key counts as 0. Any expiry on the key is kept.
    fn incr(&self, key: &str) -> Result<i64>;

    /// Sets a TTL on an existing key. Returns false if the key does not exist.
    /// A zero `ttl` removes the key, as in
    /// [`set_with_expiry`](Self::set_with_expiry).
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    fn exists(&self, key: &str) -> Result<bool>;

    /// Appends to the list at `key` and returns its new length.
    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64>;

    /// Reads the inclusive range `start..=stop` of the list at `key`.
    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>>;

    /// Removes every key. Destructive; see
    /// [`CacheConfig::flush_on_init`](crate::CacheConfig::flush_on_init).
    fn flush(&self) -> Result<()>;

    /// Reads the whole list at `key`.
    fn lrange_all(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.lrange(key, 0, -1)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        (**self).set_with_expiry(key, value, ttl)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        (**self).incr(key)
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        (**self).expire(key, ttl)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).rpush(key, value)
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        (**self).lrange(key, start, stop)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Resolves Redis-style inclusive list indices against a list of length `len`.
///
/// Returns the half-open range of positions to read, or `None` when the range
/// selects nothing.
///
/// # Examples
///
/// ```
/// use kvtrace_core::store::resolve_range;
///
/// assert_eq!(resolve_range(5, 0, -1), Some(0..5));
/// assert_eq!(resolve_range(5, -2, -1), Some(3..5));
/// assert_eq!(resolve_range(5, 1, 100), Some(1..5));
/// assert_eq!(resolve_range(5, 4, 2), None);
/// assert_eq!(resolve_range(0, 0, -1), None);
/// ```
pub fn resolve_range(len: usize, start: i64, stop: i64) -> Option<std::ops::Range<usize>> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some(start as usize..(stop + 1) as usize)
}
