//! Page fetchers consumed by [`ExpiringFetchCache`](crate::ExpiringFetchCache).

use crate::Result;

/// Fetches the body of a URL.
///
/// Any `Fn(&str) -> Result<String>` closure is a fetcher, which keeps tests
/// free of network access:
///
/// ```
/// use kvtrace_core::{PageFetcher, Result};
///
/// let fake = |url: &str| -> Result<String> { Ok(format!("<html>{}</html>", url)) };
/// assert_eq!(fake.fetch("http://x/y").unwrap(), "<html>http://x/y</html>");
/// ```
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F> PageFetcher for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<String> {
        self(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use super::PageFetcher;
    use crate::{CacheError, Result};
    use std::time::Duration;
    use tracing::debug;

    /// Blocking HTTP GET over a shared [`ureq::Agent`].
    ///
    /// Transport failures map to [`CacheError::Connectivity`], non-2xx answers
    /// to [`CacheError::Http`].
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        agent: ureq::Agent,
    }

    impl HttpFetcher {
        /// Default read timeout in seconds (can be overridden by env).
        const DEFAULT_TIMEOUT_SECS: u64 = 30;
        /// Default connect timeout in seconds (can be overridden by env).
        const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

        fn default_timeouts() -> (Duration, Duration) {
            let timeout_secs = std::env::var("KVTRACE_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
            let connect_secs = std::env::var("KVTRACE_HTTP_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(Self::DEFAULT_CONNECT_TIMEOUT_SECS);
            (
                Duration::from_secs(timeout_secs),
                Duration::from_secs(connect_secs),
            )
        }

        /// Creates a fetcher with timeouts from the environment or defaults.
        pub fn new() -> Self {
            let (timeout, connect_timeout) = Self::default_timeouts();
            Self::with_timeouts(timeout, connect_timeout)
        }

        pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout(timeout)
                .timeout_connect(connect_timeout)
                .build();
            Self { agent }
        }
    }

    impl Default for HttpFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PageFetcher for HttpFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            debug!(url, "GET");
            match self.agent.get(url).call() {
                Ok(response) => response
                    .into_string()
                    .map_err(|e| CacheError::Connectivity(format!("reading {}: {}", url, e))),
                Err(ureq::Error::Status(status, _)) => Err(CacheError::Http {
                    url: url.to_string(),
                    status,
                }),
                Err(err) => Err(CacheError::Connectivity(err.to_string())),
            }
        }
    }

}
