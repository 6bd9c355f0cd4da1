//! Proxy Service for orchestrating one proxied request.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          ProxyService                            │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                        handle()                            │  │
//! │  │  1. Validate url      3. Fetch source bytes                │  │
//! │  │  2. Resolve target    4. Transform on the blocking pool    │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │         │                      │                     │           │
//! │         ▼                      ▼                     ▼           │
//! │  ┌──────────────┐     ┌────────────────┐   ┌──────────────────┐  │
//! │  │TargetResolver│     │ OriginFetcher  │   │TransformPipeline │  │
//! │  └──────────────┘     └────────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::debug;

use super::request::ProxyRequest;
use crate::error::{CodecError, ProxyError};
use crate::io::OriginFetcher;
use crate::resolve::{OutputFormat, ResizeTarget, TargetResolver};
use crate::transform::{Codec, EncodedResult, RasterCodec, TransformPipeline};

/// Default number of transforms allowed to run at once: one per CPU.
pub fn default_transform_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Service that turns a [`ProxyRequest`] into an [`EncodedResult`].
///
/// Holds no per-request state. Transforms run on tokio's blocking pool, and a
/// semaphore bounds how many run at once so peak memory stays proportional to
/// the permit count rather than to the request rate.
///
/// # Type Parameters
///
/// * `F` - The origin fetcher (e.g., [`HttpOriginFetcher`](crate::io::HttpOriginFetcher))
/// * `C` - The image codec (defaults to [`RasterCodec`])
///
/// # Example
///
/// ```ignore
/// use resize_proxy::io::HttpOriginFetcher;
/// use resize_proxy::proxy::{ProxyRequest, ProxyService};
/// use resize_proxy::resolve::TargetResolver;
/// use resize_proxy::transform::TransformPipeline;
///
/// let service = ProxyService::new(
///     HttpOriginFetcher::with_defaults()?,
///     TransformPipeline::default(),
///     TargetResolver::default(),
/// );
///
/// let request = ProxyRequest::from_query(Some("url=https://example.com/a.jpg&mobile"), None);
/// let result = service.handle(&request).await?;
/// println!("{} bytes of {}", result.data.len(), result.mime_type());
/// ```
pub struct ProxyService<F: OriginFetcher, C: Codec = RasterCodec> {
    fetcher: Arc<F>,
    pipeline: Arc<TransformPipeline<C>>,
    resolver: TargetResolver,
    permits: Arc<Semaphore>,
    max_concurrent_transforms: usize,
}

impl<F: OriginFetcher + 'static, C: Codec> ProxyService<F, C> {
    /// Create a service allowing one concurrent transform per CPU.
    pub fn new(fetcher: F, pipeline: TransformPipeline<C>, resolver: TargetResolver) -> Self {
        let max = default_transform_concurrency();
        Self {
            fetcher: Arc::new(fetcher),
            pipeline: Arc::new(pipeline),
            resolver,
            permits: Arc::new(Semaphore::new(max)),
            max_concurrent_transforms: max,
        }
    }

    /// Set the maximum number of concurrent transforms (at least 1).
    pub fn with_max_concurrent_transforms(mut self, max: usize) -> Self {
        let max = max.max(1);
        self.permits = Arc::new(Semaphore::new(max));
        self.max_concurrent_transforms = max;
        self
    }

    /// Maximum number of concurrent transforms.
    pub fn max_concurrent_transforms(&self) -> usize {
        self.max_concurrent_transforms
    }

    /// The origin fetcher.
    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Run a request end to end.
    ///
    /// # Errors
    ///
    /// - `Input` if `url` is missing or not an absolute http(s) URL
    /// - `Upstream` if the origin fetch fails
    /// - `Codec` if decoding, resizing or encoding fails after fallback
    pub async fn handle(&self, request: &ProxyRequest) -> Result<EncodedResult, ProxyError> {
        let url = request.source_url()?;
        let (target, format) = self
            .resolver
            .resolve(&request.hints, request.accept.as_deref());

        debug!(url = %url, target = ?target, format = format.name(), "Resolved request");

        let source = self.fetcher.fetch(url.as_str()).await?;
        let result = self.transform(source, target, format).await?;

        debug!(
            width = result.width,
            height = result.height,
            format = result.format.name(),
            bytes = result.data.len(),
            "Transformed image"
        );

        Ok(result)
    }

    /// Run the transform pipeline on the blocking pool.
    ///
    /// The permit moves into the blocking task, so it stays held until the
    /// CPU work is actually done even if the caller is dropped.
    pub async fn transform(
        &self,
        source: Bytes,
        target: ResizeTarget,
        format: OutputFormat,
    ) -> Result<EncodedResult, CodecError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| CodecError::Worker {
                message: e.to_string(),
            })?;

        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            pipeline.transform(&source, &target, format)
        })
        .await
        .map_err(|e| CodecError::Worker {
            message: e.to_string(),
        })?
    }
}
