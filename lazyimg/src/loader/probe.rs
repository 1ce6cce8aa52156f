//! Fetch-and-probe image loader.
//!
//! A load succeeds when the resource can be fetched within the configured
//! limits *and* its header decodes as a known image format. Only the header is
//! decoded (format and dimensions); pixel data is never materialised.
//!
//! # Sources
//!
//! | Source                       | Fetched via                |
//! |------------------------------|----------------------------|
//! | `http://…`, `https://…`      | the [`AsyncHttpClient`]    |
//! | `file:///path`, bare paths   | `tokio::fs`                |
//! | any other scheme, `data:`    | rejected as unsupported    |

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::LocalBoxFuture;
use image::ImageReader;

use super::config::LoaderConfig;
use super::error::LoadError;
use super::http::{AsyncHttpClient, ReqwestClient};
use super::{ImageInfo, ImageLoader, LoadOutcome};

/// Where a source URL is fetched from.
#[derive(Debug, PartialEq, Eq)]
enum SourceKind<'a> {
    Remote,
    File(&'a Path),
    Unsupported,
}

impl<'a> SourceKind<'a> {
    fn classify(source: &'a str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            SourceKind::Remote
        } else if let Some(path) = source.strip_prefix("file://") {
            SourceKind::File(Path::new(path))
        } else if source.starts_with("data:") || source.contains("://") {
            SourceKind::Unsupported
        } else {
            SourceKind::File(Path::new(source))
        }
    }
}

/// Decode just enough of `bytes` to identify the image.
///
/// # Arguments
///
/// * `url` - Source URL, used in error messages
/// * `bytes` - Raw resource body
pub fn decode_probe(url: &str, bytes: &[u8]) -> Result<ImageInfo, LoadError> {
    let decode_error = |reason: String| LoadError::Decode {
        url: url.to_string(),
        reason,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| decode_error("unrecognized image format".to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| decode_error(e.to_string()))?;

    Ok(ImageInfo {
        format: Some(format),
        width,
        height,
        byte_len: bytes.len(),
    })
}

/// Image loader that fetches the resource and probes its header.
pub struct ProbeLoader<C: AsyncHttpClient> {
    client: Arc<C>,
    config: LoaderConfig,
}

impl ProbeLoader<ReqwestClient> {
    /// Create a loader backed by reqwest.
    pub fn from_config(config: LoaderConfig) -> Result<Self, LoadError> {
        let client = ReqwestClient::from_config(&config)?;
        Ok(Self::new(client, config))
    }
}

impl<C: AsyncHttpClient> ProbeLoader<C> {
    /// Create a loader using the given HTTP client.
    pub fn new(client: C, config: LoaderConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// The loader's settings.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetch `source` and probe it.
    ///
    /// The whole attempt (fetch plus decode) is bounded by the configured
    /// timeout. There is no retry.
    pub async fn probe(&self, source: &str) -> Result<ImageInfo, LoadError> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let bytes = tokio::time::timeout(timeout, self.fetch(source))
            .await
            .map_err(|_| LoadError::Timeout {
                url: source.to_string(),
                timeout_secs: self.config.timeout_secs,
            })??;

        let info = decode_probe(source, &bytes)?;
        tracing::trace!(
            source = %source,
            width = info.width,
            height = info.height,
            bytes = info.byte_len,
            "Probed image"
        );
        Ok(info)
    }

    async fn fetch(&self, source: &str) -> Result<Bytes, LoadError> {
        match SourceKind::classify(source) {
            SourceKind::Remote => self.client.get(source).await,
            SourceKind::File(path) => read_file(source, path, self.config.max_bytes).await,
            SourceKind::Unsupported => Err(LoadError::UnsupportedSource(source.to_string())),
        }
    }
}

impl<C: AsyncHttpClient> Clone for ProbeLoader<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
        }
    }
}

impl<C: AsyncHttpClient + 'static> ImageLoader for ProbeLoader<C> {
    fn load(&self, source: &str) -> LocalBoxFuture<'static, LoadOutcome> {
        let loader = self.clone();
        let source = source.to_string();
        Box::pin(async move { LoadOutcome::from(loader.probe(&source).await) })
    }
}

async fn read_file(url: &str, path: &Path, max_bytes: u64) -> Result<Bytes, LoadError> {
    let io_error = |e: std::io::Error| LoadError::Io {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
    if metadata.len() > max_bytes {
        return Err(LoadError::TooLarge {
            url: url.to_string(),
            max_bytes,
        });
    }

    tokio::fs::read(path).await.map(Bytes::from).map_err(io_error)
}
