use thiserror::Error;

/// Result alias used throughout kvtrace.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced by stores, caches and fetchers.
///
/// Nothing in kvtrace retries or swallows these: every failure bubbles up to
/// the immediate caller. The only place an error changes what gets written is
/// call history, where a failed operation records neither its input nor its
/// output.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store or the network could not be reached.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// Stored bytes could not be converted to the requested type.
    #[error("cannot decode stored value as {target}: {reason}")]
    Decode {
        target: &'static str,
        reason: String,
    },

    /// A key that had to be present was absent.
    #[error("key `{0}` not found")]
    NotFound(String),

    /// The store refused the command, e.g. a list operation on a scalar key.
    #[error("store rejected command: {0}")]
    Store(String),

    /// The server answered a fetch with a non-success status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// Writing a replay to its destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Shorthand for building a [`CacheError::Decode`].
    pub fn decode(target: &'static str, reason: impl ToString) -> Self {
        CacheError::Decode {
            target,
            reason: reason.to_string(),
        }
    }

    /// Returns true for failures caused by an unreachable store or network.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CacheError::Connectivity(_))
    }
}
