use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::debug;

use super::OriginFetcher;
use crate::error::FetchError;

/// Default timeout for a whole origin exchange (10 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default ceiling on the size of a source image body (25 MiB).
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 25 * 1024 * 1024;

/// Initial buffer capacity when the origin sends no `Content-Length`.
const INITIAL_BUFFER_CAPACITY: u64 = 64 * 1024;

const USER_AGENT: &str = concat!("resize-proxy/", env!("CARGO_PKG_VERSION"));

/// HTTP(S) implementation of [`OriginFetcher`].
///
/// Enforces a timeout on the whole exchange and a byte ceiling on the body.
/// The ceiling is checked against `Content-Length` before reading and again
/// while streaming, so a lying or missing length never buffers past it.
#[derive(Debug, Clone)]
pub struct HttpOriginFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpOriginFetcher {
    /// Create a fetcher with its own connection pool.
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_bytes,
        })
    }

    /// Create a fetcher with the default timeout and size ceiling.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_BYTES)
    }

    /// Maximum accepted body size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl OriginFetcher for HttpOriginFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let declared = response.content_length();
        if let Some(len) = declared {
            if len > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        let capacity = declared
            .unwrap_or(INITIAL_BUFFER_CAPACITY)
            .min(self.max_bytes);
        let mut buf = BytesMut::with_capacity(capacity as usize);

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if buf.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            buf.extend_from_slice(&chunk);
        }

        debug!(bytes = buf.len(), "Fetched source image");
        Ok(buf.freeze())
    }
}
