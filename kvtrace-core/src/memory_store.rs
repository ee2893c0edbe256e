use crate::clock::{Clock, SystemClock};
use crate::store::resolve_range;
use crate::store_entry::{StoreEntry, StoredData};
use crate::value::decode_int;
use crate::{CacheError, KeyValueStore, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// An in-process [`KeyValueStore`].
///
/// Entries live in a sharded [`DashMap`]; each command holds the shard lock
/// of its key for its whole read-modify-write, which gives the same
/// per-command atomicity a remote store offers. Expired entries are dropped
/// when a command touches them, and the whole map is swept for expired
/// entries at most once per [`SWEEP_INTERVAL`], so keys that are never read
/// again still release their memory.
///
/// Handy for tests and single-process deployments. State is not shared with
/// other processes.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("greeting", b"hello").unwrap();
/// assert_eq!(store.get("greeting").unwrap(), Some(b"hello".to_vec()));
///
/// assert_eq!(store.incr("hits").unwrap(), 1);
/// assert_eq!(store.incr("hits").unwrap(), 2);
/// ```
pub struct MemoryStore {
    entries: DashMap<String, StoreEntry>,
    clock: Arc<dyn Clock>,
    last_sweep: Mutex<Instant>,
}

/// Minimum time between two full sweeps of expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

impl MemoryStore {
    /// Creates an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            entries: DashMap::new(),
            clock,
            last_sweep: Mutex::new(now),
        }
    }

    /// Number of live (non-expired) keys.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of `key`, `None` if it is absent or has no TTL.
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.time_to_live(now))
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        *self.last_sweep.lock() = now;
        self.sweep_at(now)
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let dropped = before.saturating_sub(self.entries.len());
        if dropped > 0 {
            debug!(dropped, "swept expired entries");
        }
        dropped
    }

    /// Sweeps if the last sweep is older than [`SWEEP_INTERVAL`]. Must not be
    /// called while a reference into `entries` is held.
    fn maybe_sweep(&self, now: Instant) {
        // Skip while another command is sweeping.
        let Some(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last) < SWEEP_INTERVAL {
            return;
        }
        *last = now;
        drop(last);
        self.sweep_at(now);
    }

    /// Drops `key` if it has expired and returns the current instant.
    fn purge_expired(&self, key: &str) -> Instant {
        let now = self.clock.now();
        self.maybe_sweep(now);
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        now
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.entries.len())
            .field("clock", &self.clock)
            .finish()
    }
}

fn wrong_type(key: &str, found: &StoredData) -> CacheError {
    CacheError::Store(format!(
        "WRONGTYPE key `{}` holds a {} value",
        key,
        found.kind()
    ))
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.purge_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.data {
                StoredData::Scalar(bytes) => Ok(Some(bytes.clone())),
                other => Err(wrong_type(key, other)),
            },
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let now = self.clock.now();
        self.maybe_sweep(now);
        self.entries.insert(
            key.to_string(),
            StoreEntry::new(StoredData::Scalar(value.to_vec()), now),
        );
        Ok(())
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let now = self.clock.now();
        self.maybe_sweep(now);
        if ttl.is_zero() {
            self.entries.remove(key);
            return Ok(());
        }
        let entry = StoreEntry::new(StoredData::Scalar(value.to_vec()), now).with_ttl(now, ttl);
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let now = self.purge_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoreEntry::new(StoredData::Scalar(b"0".to_vec()), now));

        match &mut entry.data {
            StoredData::Scalar(bytes) => {
                let next = decode_int(bytes)?
                    .checked_add(1)
                    .ok_or_else(|| CacheError::decode("integer", "increment would overflow"))?;
                *bytes = next.to_string().into_bytes();
                Ok(next)
            }
            other => Err(wrong_type(key, other)),
        }
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = self.purge_expired(key);
        if ttl.is_zero() {
            return Ok(self.entries.remove(key).is_some());
        }
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expire_in(now, ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.purge_expired(key);
        Ok(self.entries.contains_key(key))
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        let now = self.purge_expired(key);
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match &mut occupied.get_mut().data {
                StoredData::List(items) => {
                    items.push(value.to_vec());
                    Ok(items.len() as u64)
                }
                other => Err(wrong_type(key, other)),
            },
            Entry::Vacant(vacant) => {
                vacant.insert(StoreEntry::new(StoredData::List(vec![value.to_vec()]), now));
                Ok(1)
            }
        }
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        self.purge_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        match &entry.data {
            StoredData::List(items) => Ok(resolve_range(items.len(), start, stop)
                .map(|range| items[range].to_vec())
                .unwrap_or_default()),
            other => Err(wrong_type(key, other)),
        }
    }

    fn flush(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
