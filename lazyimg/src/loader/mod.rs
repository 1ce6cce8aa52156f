//! Image loading.
//!
//! An [`ImageLoader`] performs the single out-of-band fetch of a tracked
//! element's real resource. It returns a future that resolves to exactly one
//! [`LoadOutcome`]; the lifecycle controller spawns that future on the host
//! and treats its completion as the load signal.
//!
//! Loaders do not retry and do not deduplicate. Invoking a loader at most once
//! per binding is the controller's job.
//!
//! # Implementors
//!
//! - [`ProbeLoader`] - fetches over HTTP or from disk and probes the image header
//! - [`StaticLoader`] - fixed outcomes, for simulation and tests

mod config;
mod error;
mod http;
mod probe;
mod static_loader;

use std::fmt;

use futures::future::LocalBoxFuture;
use image::ImageFormat;

pub use config::{LoaderConfig, DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use error::LoadError;
pub use http::{AsyncHttpClient, HttpFuture, ReqwestClient};
pub use probe::{decode_probe, ProbeLoader};
pub use static_loader::{StaticLoader, SIMULATED_FAILURE};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

/// Metadata about a successfully loaded image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    /// Detected container format, if probed.
    pub format: Option<ImageFormat>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Size of the fetched body.
    pub byte_len: usize,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Some(format) => write!(
                f,
                "{:?} {}x{} ({} bytes)",
                format, self.width, self.height, self.byte_len
            ),
            None => write!(f, "{}x{} ({} bytes)", self.width, self.height, self.byte_len),
        }
    }
}

/// Result of one load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The resource was fetched and is decodable.
    Loaded(ImageInfo),
    /// The resource failed to load.
    Errored(LoadError),
}

impl LoadOutcome {
    /// Whether the attempt succeeded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

impl From<Result<ImageInfo, LoadError>> for LoadOutcome {
    fn from(result: Result<ImageInfo, LoadError>) -> Self {
        match result {
            Ok(info) => LoadOutcome::Loaded(info),
            Err(err) => LoadOutcome::Errored(err),
        }
    }
}

/// Performs the asynchronous fetch of an image resource.
pub trait ImageLoader {
    /// Start loading `source`.
    ///
    /// The returned future must not borrow the loader and resolves exactly
    /// once.
    fn load(&self, source: &str) -> LocalBoxFuture<'static, LoadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_info_display() {
        let info = ImageInfo {
            format: Some(ImageFormat::Png),
            width: 640,
            height: 480,
            byte_len: 2048,
        };
        assert_eq!(info.to_string(), "Png 640x480 (2048 bytes)");
        assert_eq!(ImageInfo::default().to_string(), "0x0 (0 bytes)");
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome: LoadOutcome = Ok(ImageInfo::default()).into();
        assert!(outcome.is_loaded());

        let outcome: LoadOutcome = Err(LoadError::MissingSource).into();
        assert_eq!(outcome, LoadOutcome::Errored(LoadError::MissingSource));
    }
}
