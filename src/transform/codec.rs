//! Image codec seam.
//!
//! The pipeline only needs three primitives from an image library: decode,
//! resize, encode. [`Codec`] names that surface; [`RasterCodec`] implements it
//! with the `image` crate.
//!
//! # Format support
//!
//! | Stage  | Formats                                         |
//! |--------|-------------------------------------------------|
//! | Decode | JPEG, PNG, GIF, WebP, BMP, TIFF (sniffed)       |
//! | Encode | JPEG (lossy), WebP (lossless), AVIF (rav1e)     |

use std::borrow::Cow;
use std::io::Cursor;

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::error::CodecError;
use crate::resolve::{EncodeProfile, OutputFormat, MAX_EFFORT};

/// Default ceiling on decoded source pixels (100 megapixels).
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// Worst-case decoded bytes per pixel (16-bit RGBA).
const MAX_BYTES_PER_PIXEL: u64 = 8;

/// A decoded source image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Width in pixels (always > 0)
    pub width: u32,

    /// Height in pixels (always > 0)
    pub height: u32,

    /// Decoded pixels
    pub pixels: DynamicImage,
}

/// Decode, resize and encode primitives used by the transform pipeline.
///
/// Implementations run on the blocking thread pool and are shared between
/// requests, so they must be `Send + Sync` and hold no per-request state.
pub trait Codec: Send + Sync + 'static {
    /// Decode raw bytes into pixels. The format is sniffed from the content.
    fn decode(&self, data: &[u8]) -> Result<SourceImage, CodecError>;

    /// Resample to exactly `width` x `height`.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32)
        -> Result<DynamicImage, CodecError>;

    /// Encode pixels into `format` using `profile`.
    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        profile: &EncodeProfile,
    ) -> Result<Vec<u8>, CodecError>;
}

// =============================================================================
// Raster Codec
// =============================================================================

/// [`Codec`] backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    max_pixels: u64,
}

impl RasterCodec {
    /// Create a codec that refuses to decode sources above `max_pixels`.
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    /// Decode pixel ceiling.
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, CodecError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })
    }

    fn limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_alloc = Some(self.max_pixels.saturating_mul(MAX_BYTES_PER_PIXEL));
        limits
    }
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SOURCE_PIXELS)
    }
}

impl Codec for RasterCodec {
    fn decode(&self, data: &[u8]) -> Result<SourceImage, CodecError> {
        // Header-only pass first so oversize sources are rejected before any
        // pixel buffer is allocated.
        let (width, height) = Self::reader(data)?
            .into_dimensions()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;

        if width == 0 || height == 0 {
            return Err(CodecError::Decode {
                message: format!("image has zero dimension ({}x{})", width, height),
            });
        }

        if width as u64 * height as u64 > self.max_pixels {
            return Err(CodecError::TooManyPixels {
                width,
                height,
                max_pixels: self.max_pixels,
            });
        }

        let mut reader = Self::reader(data)?;
        reader.limits(self.limits());
        let pixels = reader.decode().map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        Ok(SourceImage {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        })
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::Resize {
                message: format!("target size {}x{} is empty", width, height),
            });
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        profile: &EncodeProfile,
    ) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::new();

        let result = match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let encoder = JpegEncoder::new_with_quality(&mut output, profile.quality);
                image.to_rgb8().write_with_encoder(encoder)
            }
            OutputFormat::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut output);
                to_8bit(image).write_with_encoder(encoder)
            }
            OutputFormat::Avif => {
                let encoder = AvifEncoder::new_with_speed_quality(
                    &mut output,
                    avif_speed(profile.effort),
                    profile.quality,
                );
                to_8bit(image).write_with_encoder(encoder)
            }
        };

        result.map_err(|e| CodecError::Encode {
            format,
            message: e.to_string(),
        })?;

        Ok(output)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Map effort (0 fastest .. 9 slowest) onto rav1e speed (10 fastest .. 1 slowest).
#[inline]
pub fn avif_speed(effort: u8) -> u8 {
    (10 - effort.min(MAX_EFFORT)).clamp(1, 10)
}

/// Narrow to 8-bit RGB or RGBA, which every encoder accepts.
fn to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}
