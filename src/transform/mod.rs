//! Image transform layer.
//!
//! Turns fetched source bytes into the encoded response body.
//!
//! # Components
//!
//! - [`TransformPipeline`]: decode → fit-inside resize → encode with JPEG fallback
//! - [`Codec`]: the decode/resize/encode surface the pipeline depends on
//! - [`RasterCodec`]: [`Codec`] implementation on the `image` crate
//! - [`output_dimensions`]: longer-edge and explicit-box sizing rules
//! - [`EncodedResult`]: bytes plus the format actually produced
//!
//! # Example
//!
//! ```no_run
//! use resize_proxy::resolve::{OutputFormat, ResizeTarget};
//! use resize_proxy::transform::TransformPipeline;
//!
//! let source: Vec<u8> = std::fs::read("photo.jpg").unwrap();
//! let pipeline = TransformPipeline::default();
//! let result = pipeline
//!     .transform(&source, &ResizeTarget::MaxEdge(375), OutputFormat::WebP)
//!     .unwrap();
//! println!("{}x{} {}", result.width, result.height, result.mime_type());
//! ```

mod codec;
mod dimensions;
mod pipeline;

pub use codec::{avif_speed, Codec, RasterCodec, SourceImage, DEFAULT_MAX_SOURCE_PIXELS};
pub use dimensions::{fit_inside, output_dimensions, resize_box, Orientation, ResizeBox};
pub use pipeline::{EncodedResult, TransformPipeline};
