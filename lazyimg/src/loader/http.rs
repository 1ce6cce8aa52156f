//! HTTP client abstraction for testability

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use super::config::LoaderConfig;
use super::error::LoadError;

/// Boxed future returned by [`AsyncHttpClient::get`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, LoadError>> + Send + 'a>>;

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get<'a>(&'a self, url: &'a str) -> HttpFuture<'a>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, LoadError> {
        Self::from_config(&LoaderConfig::default())
    }

    /// Creates a new ReqwestClient from loader settings.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, LoadError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LoadError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_bytes: config.max_bytes,
        })
    }

    fn map_request_error(&self, url: &str, err: reqwest::Error) -> LoadError {
        if err.is_timeout() {
            LoadError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            LoadError::Http {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, LoadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_request_error(url, e))?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let too_large = || LoadError::TooLarge {
            url: url.to_string(),
            max_bytes: self.max_bytes,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(too_large());
        }

        // Read body in chunks so an unannounced oversized body is cut off early
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_request_error(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> HttpFuture<'a> {
        Box::pin(self.fetch(url))
    }
}
