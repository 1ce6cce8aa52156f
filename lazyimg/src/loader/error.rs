//! Error types for image loading.

use thiserror::Error;

/// Reasons a single load attempt can fail.
///
/// Every variant that concerns a specific resource carries its URL so the
/// lifecycle diagnostic can name the failing image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientSetup(String),

    /// The request could not be completed.
    #[error("Request failed for {url}: {reason}")]
    Http { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body exceeded the configured limit.
    #[error("Response from {url} exceeds {max_bytes} bytes")]
    TooLarge { url: String, max_bytes: u64 },

    /// Reading a local file failed.
    #[error("Failed to read {url}: {reason}")]
    Io { url: String, reason: String },

    /// The bytes are not a decodable image.
    #[error("Can't decode image {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The attempt did not finish in time.
    #[error("Timed out after {timeout_secs}s loading {url}")]
    Timeout { url: String, timeout_secs: u64 },

    /// The URL scheme is not handled by this loader.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// The tracked element carries no source URL.
    #[error("Element has no source")]
    MissingSource,
}

impl LoadError {
    /// URL of the resource that failed, if the error concerns one.
    pub fn url(&self) -> Option<&str> {
        match self {
            LoadError::Http { url, .. }
            | LoadError::Status { url, .. }
            | LoadError::TooLarge { url, .. }
            | LoadError::Io { url, .. }
            | LoadError::Decode { url, .. }
            | LoadError::Timeout { url, .. } => Some(url),
            LoadError::UnsupportedSource(url) => Some(url),
            LoadError::ClientSetup(_) | LoadError::MissingSource => None,
        }
    }
}
