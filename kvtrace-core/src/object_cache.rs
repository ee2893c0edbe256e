use crate::instrument::{instrument, render_args};
use crate::replay::{replay, Replay};
use crate::value::{decode_float, decode_int, decode_utf8};
use crate::{CacheConfig, CacheError, Decoder, Key, KeyValueStore, Result, StoredValue};
use std::io;
use std::sync::Arc;
use tracing::info;

/// Stores values under freshly generated keys and reads them back.
///
/// The cache owns no data itself. Everything, including the call counter and
/// history of [`store`](Self::store), lives in the injected store handle, so
/// several caches (or processes) over the same store see the same state.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{CacheConfig, MemoryStore, ObjectCache};
/// use std::sync::Arc;
///
/// let cache = ObjectCache::new(Arc::new(MemoryStore::new()), CacheConfig::default()).unwrap();
///
/// let key = cache.store("hello").unwrap();
/// assert_eq!(cache.get_as_string(&key).unwrap().as_deref(), Some("hello"));
/// assert!(cache.get_as_int(&key).is_err());
///
/// let history = cache.replay_store().unwrap();
/// assert_eq!(history.count, 1);
/// ```
pub struct ObjectCache<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    config: CacheConfig,
}

impl<S: KeyValueStore + ?Sized> ObjectCache<S> {
    /// Builds a cache over `store`.
    ///
    /// With [`CacheConfig::flush_on_init`] set, the whole store is flushed
    /// first. That is destructive and not idempotent; see the field docs.
    pub fn new(store: Arc<S>, config: CacheConfig) -> Result<Self> {
        if config.flush_on_init {
            info!("flushing store on cache initialization");
            store.flush()?;
        }
        Ok(Self { store, config })
    }

    /// Persists `value` under a new random key and returns the key.
    ///
    /// Instrumented: every call bumps the counter of
    /// [`CacheConfig::store_operation`] and every successful call appends the
    /// rendered value and the returned key to its history.
    pub fn store(&self, value: impl Into<StoredValue>) -> Result<Key> {
        let value = value.into();
        let input = render_args(&[&value]);

        instrument(&*self.store, &self.config.store_operation, &input, || {
            let key = Key::generate();
            self.store.set(key.as_str(), &value.to_bytes())?;
            Ok(key)
        })
    }

    /// Reads the value at `key` and decodes it with `decoder`.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    pub fn get(&self, key: impl AsRef<str>, decoder: Decoder) -> Result<Option<StoredValue>> {
        self.store
            .get(key.as_ref())?
            .map(|bytes| decoder.decode(bytes))
            .transpose()
    }

    /// Like [`get`](Self::get), but an absent key is [`CacheError::NotFound`].
    pub fn require(&self, key: impl AsRef<str>, decoder: Decoder) -> Result<StoredValue> {
        let key = key.as_ref();
        self.get(key, decoder)?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    pub fn get_raw(&self, key: impl AsRef<str>) -> Result<Option<Vec<u8>>> {
        self.store.get(key.as_ref())
    }

    /// Reads the value at `key` as UTF-8 text.
    pub fn get_as_string(&self, key: impl AsRef<str>) -> Result<Option<String>> {
        self.store.get(key.as_ref())?.map(decode_utf8).transpose()
    }

    /// Reads the value at `key` as a decimal integer.
    pub fn get_as_int(&self, key: impl AsRef<str>) -> Result<Option<i64>> {
        self.store
            .get(key.as_ref())?
            .map(|bytes| decode_int(&bytes))
            .transpose()
    }

    pub fn get_as_float(&self, key: impl AsRef<str>) -> Result<Option<f64>> {
        self.store
            .get(key.as_ref())?
            .map(|bytes| decode_float(&bytes))
            .transpose()
    }

    /// History of any instrumented operation recorded in this cache's store.
    pub fn replay(&self, operation: &str) -> Result<Replay> {
        replay(&*self.store, operation)
    }

    /// History of [`store`](Self::store).
    pub fn replay_store(&self) -> Result<Replay> {
        self.replay(&self.config.store_operation)
    }

    /// Writes the history of `operation` to `out`.
    pub fn print_replay<W: io::Write>(&self, operation: &str, out: W) -> Result<()> {
        self.replay(operation)?.write_to(out)?;
        Ok(())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The shared store handle.
    pub fn store_handle(&self) -> &Arc<S> {
        &self.store
    }
}
