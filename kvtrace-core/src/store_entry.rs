use std::time::{Duration, Instant};

/// Payload held under a single key: either a scalar byte string or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredData {
    Scalar(Vec<u8>),
    List(Vec<Vec<u8>>),
}

impl StoredData {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredData::Scalar(_) => "scalar",
            StoredData::List(_) => "list",
        }
    }
}

/// Wrapper that tracks when a value was written and when it stops being
/// visible.
///
/// Expiry is absolute: `expires_at` is computed once from the write time and
/// the TTL, so later reads never extend it. Overwriting a key with a plain set
/// replaces the entry and drops any expiry, while counter increments keep it.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{StoreEntry, StoredData};
/// use std::time::{Duration, Instant};
///
/// let now = Instant::now();
/// let entry = StoreEntry::new(StoredData::Scalar(b"body".to_vec()), now)
///     .with_ttl(now, Duration::from_secs(10));
///
/// assert!(!entry.is_expired(now + Duration::from_secs(9)));
/// assert!(entry.is_expired(now + Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub data: StoredData,
    pub inserted_at: Instant,
    pub expires_at: Option<Instant>,
}

impl StoreEntry {
    /// Creates an entry with no expiry.
    pub fn new(data: StoredData, now: Instant) -> Self {
        Self {
            data,
            inserted_at: now,
            expires_at: None,
        }
    }

    /// Sets the expiry to `now + ttl`.
    pub fn with_ttl(mut self, now: Instant, ttl: Duration) -> Self {
        self.expire_in(now, ttl);
        self
    }

    /// Replaces the expiry with `now + ttl`. A TTL too large for the clock
    /// to represent leaves the entry without an expiry.
    pub fn expire_in(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = now.checked_add(ttl);
    }

    /// Returns true once `now` has reached the expiry instant. Entries without
    /// a TTL never expire.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now >= at,
            None => false,
        }
    }

    /// Remaining lifetime, `None` for entries without a TTL.
    pub fn time_to_live(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_never_expires() {
        let now = Instant::now();
        let entry = StoreEntry::new(StoredData::Scalar(b"42".to_vec()), now);
        assert!(!entry.is_expired(now + Duration::from_secs(3600)));
        assert_eq!(entry.time_to_live(now), None);
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let now = Instant::now();
        let entry = StoreEntry::new(StoredData::Scalar(b"data".to_vec()), now)
            .with_ttl(now, Duration::from_secs(1));
        assert!(!entry.is_expired(now + Duration::from_millis(999)));
        assert!(entry.is_expired(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_expire_in_resets_window() {
        let now = Instant::now();
        let mut entry =
            StoreEntry::new(StoredData::List(vec![]), now).with_ttl(now, Duration::from_secs(1));
        let later = now + Duration::from_secs(5);
        entry.expire_in(later, Duration::from_secs(10));
        assert!(!entry.is_expired(later + Duration::from_secs(9)));
        assert_eq!(entry.time_to_live(later), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let now = Instant::now();
        let entry = StoreEntry::new(StoredData::Scalar(b"data".to_vec()), now)
            .with_ttl(now, Duration::MAX);
        assert_eq!(entry.expires_at, None);
        assert!(!entry.is_expired(now + Duration::from_secs(365 * 24 * 3600)));
    }

    #[test]
    fn test_kind() {
        assert_eq!(StoredData::Scalar(vec![]).kind(), "scalar");
        assert_eq!(StoredData::List(vec![]).kind(), "list");
    }
}
