//! # kvtrace Redis
//!
//! [`KeyValueStore`] backed by a Redis server.
//!
//! Each command opens a connection from the shared [`redis::Client`], issues
//! exactly one Redis command and returns, so the store inherits Redis'
//! single-command atomicity and nothing more. Connection and timeout errors
//! surface as [`CacheError::Connectivity`] and are not retried.
//!
//! ```no_run
//! use kvtrace_core::{CacheConfig, ObjectCache};
//! use kvtrace_redis::RedisStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(RedisStore::open("redis://127.0.0.1/").unwrap());
//! let cache = ObjectCache::new(store, CacheConfig::default()).unwrap();
//! let key = cache.store("hello").unwrap();
//! println!("{}", cache.replay_store().unwrap());
//! # let _ = key;
//! ```

use kvtrace_core::{CacheError, KeyValueStore, Result};
use redis::{Client, Connection, ErrorKind, RedisError};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the server for [`RedisStore::from_env`].
pub const REDIS_URL_ENV: &str = "KVTRACE_REDIS_URL";

/// Server used when [`REDIS_URL_ENV`] is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";

#[derive(Debug, Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Creates a store for the server at `url`. No connection is made until
    /// the first command.
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(map_redis_error)?;
        Ok(Self { client })
    }

    /// Opens the server named by `KVTRACE_REDIS_URL`, falling back to
    /// [`DEFAULT_REDIS_URL`].
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(REDIS_URL_ENV).unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        debug!(url = %url, "opening redis store");
        Self::open(&url)
    }

    fn connection(&self) -> Result<Connection> {
        self.client.get_connection().map_err(map_redis_error)
    }

    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut con = self.connection()?;
        cmd.query(&mut con).map_err(map_redis_error)
    }
}

/// Longest TTL sent to Redis, which rejects expiries that overflow its
/// millisecond clock. Anything longer is clamped.
const MAX_TTL_MILLIS: u64 = (i64::MAX / 2) as u64;

/// Zero stays zero (delete); any other TTL becomes at least 1 ms.
fn ttl_millis(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, MAX_TTL_MILLIS)
}

fn map_redis_error(err: RedisError) -> CacheError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        return CacheError::Connectivity(err.to_string());
    }
    match err.kind() {
        ErrorKind::TypeError => CacheError::decode("redis value", err),
        _ => CacheError::Store(err.to_string()),
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.query(redis::cmd("SET").arg(key).arg(value))
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        match ttl_millis(ttl) {
            0 => self.query::<u64>(redis::cmd("DEL").arg(key)).map(|_| ()),
            millis => self.query(redis::cmd("PSETEX").arg(key).arg(millis).arg(value)),
        }
    }

    fn incr(&self, key: &str) -> Result<i64> {
        self.query(redis::cmd("INCR").arg(key))
    }

    // PEXPIRE with 0 deletes the key and still reports whether it existed.
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.query(redis::cmd("PEXPIRE").arg(key).arg(ttl_millis(ttl)))
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.query(redis::cmd("EXISTS").arg(key))
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.query(redis::cmd("RPUSH").arg(key).arg(value))
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop))
    }

    fn flush(&self) -> Result<()> {
        debug!("FLUSHDB");
        self.query(&redis::cmd("FLUSHDB"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::ZERO), 0);
        assert_eq!(ttl_millis(Duration::from_nanos(1)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(10)), 10_000);
        assert_eq!(ttl_millis(Duration::from_micros(1500)), 1);
        assert_eq!(ttl_millis(Duration::MAX), MAX_TTL_MILLIS);
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(RedisStore::open("not-a-redis-url").is_err());
    }

    #[test]
    fn test_unreachable_server_is_connectivity_error() {
        let store = RedisStore::open("redis://127.0.0.1:1/").unwrap();
        let err = store.get("k").unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err}");
    }
}
