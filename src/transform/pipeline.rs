//! Decode → resize → encode for a single source image.
//!
//! ```text
//! bytes ──decode──▶ SourceImage ──output_dimensions──▶ (w, h)
//!                        │                               │
//!                        └──────────resize (if needed)◀──┘
//!                                        │
//!                         encode(format) ──fail──▶ encode(JPEG)
//!                                        │                │
//!                                        ▼                ▼
//!                                   EncodedResult    EncodedResult
//! ```

use bytes::Bytes;
use image::DynamicImage;
use tracing::{debug, warn};

use super::codec::{Codec, RasterCodec, DEFAULT_MAX_SOURCE_PIXELS};
use super::dimensions::output_dimensions;
use crate::error::CodecError;
use crate::resolve::{EncodeProfiles, OutputFormat, ResizeTarget};

// =============================================================================
// Encoded Result
// =============================================================================

/// Output of a successful transform.
#[derive(Debug, Clone)]
pub struct EncodedResult {
    /// Encoded image bytes
    pub data: Bytes,

    /// Format actually produced
    pub format: OutputFormat,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Negotiated format, when encoding it failed and `format` is the fallback
    pub fallback_from: Option<OutputFormat>,
}

impl EncodedResult {
    /// MIME type of the produced format.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

// =============================================================================
// Transform Pipeline
// =============================================================================

/// Stateless decode/resize/encode pipeline.
///
/// Synchronous and CPU-bound: async callers should run it on the blocking
/// pool (see `ProxyService`).
#[derive(Debug, Clone)]
pub struct TransformPipeline<C: Codec = RasterCodec> {
    codec: C,
    profiles: EncodeProfiles,
}

impl TransformPipeline<RasterCodec> {
    /// Create a pipeline on the `image` crate codec.
    pub fn new(profiles: EncodeProfiles, max_source_pixels: u64) -> Self {
        Self::with_codec(RasterCodec::new(max_source_pixels), profiles)
    }
}

impl Default for TransformPipeline<RasterCodec> {
    fn default() -> Self {
        Self::new(EncodeProfiles::default(), DEFAULT_MAX_SOURCE_PIXELS)
    }
}

impl<C: Codec> TransformPipeline<C> {
    /// Create a pipeline on a custom codec.
    pub fn with_codec(codec: C, profiles: EncodeProfiles) -> Self {
        Self { codec, profiles }
    }

    /// Encode profiles in use.
    pub fn profiles(&self) -> &EncodeProfiles {
        &self.profiles
    }

    /// Underlying codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decode `data`, fit it inside `target`, and encode it as `format`.
    ///
    /// # Errors
    ///
    /// - `Decode` / `TooManyPixels` if `data` is not a usable image
    /// - `Resize` if resampling fails
    /// - `Encode` if neither `format` nor its JPEG fallback can be produced
    pub fn transform(
        &self,
        data: &[u8],
        target: &ResizeTarget,
        format: OutputFormat,
    ) -> Result<EncodedResult, CodecError> {
        let source = self.codec.decode(data)?;
        let (width, height) = output_dimensions(source.width, source.height, target);

        debug!(
            source_width = source.width,
            source_height = source.height,
            width,
            height,
            target = ?target,
            "Resolved output dimensions"
        );

        let pixels = if (width, height) != (source.width, source.height) {
            self.codec.resize(&source.pixels, width, height)?
        } else {
            source.pixels
        };

        let (data, produced) = self.encode_with_fallback(&pixels, format)?;

        Ok(EncodedResult {
            data: Bytes::from(data),
            format: produced,
            width,
            height,
            fallback_from: (produced != format).then_some(format),
        })
    }

    /// Encode as `format`, retrying once as JPEG if a non-JPEG encode fails.
    ///
    /// Returns the bytes and the format actually produced. When the fallback
    /// also fails, its error is returned.
    pub fn encode_with_fallback(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> Result<(Vec<u8>, OutputFormat), CodecError> {
        let err = match self
            .codec
            .encode(image, format, self.profiles.for_format(format))
        {
            Ok(data) => return Ok((data, format)),
            Err(err) => err,
        };

        let Some(fallback) = format.fallback() else {
            return Err(err);
        };

        warn!(
            format = format.name(),
            fallback = fallback.name(),
            error = %err,
            "Encode failed, falling back"
        );

        let data = self
            .codec
            .encode(image, fallback, self.profiles.for_format(fallback))?;
        Ok((data, fallback))
    }
}
