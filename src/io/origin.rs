use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Trait for retrieving the raw bytes of a source image.
///
/// This abstraction lets the proxy service work against any origin: the HTTP
/// fetcher in production, in-memory fixtures in tests. Implementations must be
/// thread-safe; a single instance serves every concurrent request.
///
/// Implementations make exactly one attempt per call. Retry policy, if any,
/// belongs to a surrounding layer.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Fetch the full body at `url`.
    ///
    /// Returns an error on transport failure, on a non-success status, or when
    /// the body exceeds the implementation's size ceiling.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
