//! # Resize Proxy
//!
//! An HTTP proxy that fetches a remote image, fits it inside a bounding box
//! chosen from request hints, and re-encodes it in the best format the client
//! accepts.
//!
//! ## Features
//!
//! - **Device-aware sizing**: `width`/`height` or `mobile`/`desktop`/`portrait` hints
//! - **Format negotiation**: AVIF, then WebP, then JPEG, driven by `Accept`
//! - **Encode fallback**: AVIF/WebP encode failures degrade to JPEG
//! - **Bounded resources**: source byte and pixel ceilings, limited concurrent transforms
//! - **Stateless**: no cache, no storage; every request is independent
//!
//! ## Architecture
//!
//! - [`resolve`] - Request hints → resize target and output format
//! - [`io`] - Origin fetching over HTTP
//! - [`transform`] - Decode, resize and encode
//! - [`proxy`] - Per-request orchestration
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use resize_proxy::{
//!     create_router, HttpOriginFetcher, ProxyService, RouterConfig, TargetResolver,
//!     TransformPipeline,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ProxyService::new(
//!         HttpOriginFetcher::with_defaults()?,
//!         TransformPipeline::default(),
//!         TargetResolver::default(),
//!     );
//!
//!     let router = create_router(service, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod proxy;
pub mod resolve;
pub mod server;
pub mod transform;

// Re-export commonly used types
pub use config::Config;
pub use error::{CodecError, FetchError, InputError, ProxyError, Stage};
pub use io::{HttpOriginFetcher, OriginFetcher};
pub use proxy::{ProxyRequest, ProxyService};
pub use resolve::{
    EncodeProfile, EncodeProfiles, OutputFormat, RequestHints, ResizeTarget, TargetResolver,
};
pub use server::{create_router, health_handler, proxy_handler, AppState, RouterConfig};
pub use transform::{Codec, EncodedResult, RasterCodec, TransformPipeline};
