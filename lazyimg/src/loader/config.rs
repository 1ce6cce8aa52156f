//! Loader settings.

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default upper bound on a fetched image body (32 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 32 * 1024 * 1024;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("lazyimg/", env!("CARGO_PKG_VERSION"));

/// Settings for [`ProbeLoader`](super::ProbeLoader) and its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Time allowed for one load attempt.
    pub timeout_secs: u64,
    /// Bodies larger than this are rejected without decoding.
    pub max_bytes: u64,
    /// `User-Agent` sent with HTTP requests.
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Set the timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the body size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}
