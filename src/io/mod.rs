//! I/O layer for retrieving source images.
//!
//! - [`OriginFetcher`]: async trait the proxy service fetches through
//! - [`HttpOriginFetcher`]: reqwest-based implementation with a timeout and byte ceiling

mod http_origin;
mod origin;

pub use http_origin::{HttpOriginFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_BYTES};
pub use origin::OriginFetcher;
