//! Output formats, their encode profiles, and Accept-header negotiation.

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Default AVIF quality (1-100).
pub const DEFAULT_AVIF_QUALITY: u8 = 50;

/// Default AVIF effort (0 = fastest, 9 = smallest output).
pub const DEFAULT_AVIF_EFFORT: u8 = 4;

/// Minimum allowed quality.
pub const MIN_QUALITY: u8 = 1;

/// Maximum allowed quality.
pub const MAX_QUALITY: u8 = 100;

/// Maximum allowed encoder effort.
pub const MAX_EFFORT: u8 = 9;

// =============================================================================
// Output Format
// =============================================================================

/// Encoding produced for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Avif,
    WebP,
    Jpeg,
}

impl OutputFormat {
    /// Pick the output format from an `Accept` header value.
    ///
    /// Strict priority: `image/avif`, then `image/webp`, then JPEG. Quality
    /// weights in the header are ignored.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let accept = accept.unwrap_or("");
        if accept.contains("image/avif") {
            OutputFormat::Avif
        } else if accept.contains("image/webp") {
            OutputFormat::WebP
        } else {
            OutputFormat::Jpeg
        }
    }

    /// MIME type for the `Content-Type` header.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Avif => "image/avif",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Avif => "AVIF",
            OutputFormat::WebP => "WEBP",
            OutputFormat::Jpeg => "JPEG",
        }
    }

    /// Lowercase token, as it appears in MIME subtypes.
    pub fn token(&self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// Format to retry with when encoding into `self` fails, if any.
    pub fn fallback(&self) -> Option<OutputFormat> {
        match self {
            OutputFormat::Avif | OutputFormat::WebP => Some(OutputFormat::Jpeg),
            OutputFormat::Jpeg => None,
        }
    }
}

// =============================================================================
// Encode Profiles
// =============================================================================

/// Encoder settings for one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfile {
    /// Lossy quality (1-100). Ignored when `lossless` is set.
    pub quality: u8,

    /// Encoder effort (0-9). Higher is slower and smaller.
    pub effort: u8,

    /// Encode losslessly.
    pub lossless: bool,
}

impl EncodeProfile {
    /// A lossy profile with the given quality and effort, clamped to range.
    pub fn lossy(quality: u8, effort: u8) -> Self {
        Self {
            quality: quality.clamp(MIN_QUALITY, MAX_QUALITY),
            effort: effort.min(MAX_EFFORT),
            lossless: false,
        }
    }

    /// A lossless profile.
    pub fn lossless() -> Self {
        Self {
            quality: MAX_QUALITY,
            effort: 0,
            lossless: true,
        }
    }
}

/// Encode profiles for every output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfiles {
    pub avif: EncodeProfile,
    pub webp: EncodeProfile,
    pub jpeg: EncodeProfile,
}

impl EncodeProfiles {
    /// Build profiles from the configurable knobs.
    ///
    /// WebP is always lossless: the `image` crate only ships a lossless WebP encoder.
    pub fn new(jpeg_quality: u8, avif_quality: u8, avif_effort: u8) -> Self {
        Self {
            avif: EncodeProfile::lossy(avif_quality, avif_effort),
            webp: EncodeProfile::lossless(),
            jpeg: EncodeProfile::lossy(jpeg_quality, 0),
        }
    }

    /// Profile for the given format.
    pub fn for_format(&self, format: OutputFormat) -> &EncodeProfile {
        match format {
            OutputFormat::Avif => &self.avif,
            OutputFormat::WebP => &self.webp,
            OutputFormat::Jpeg => &self.jpeg,
        }
    }
}

impl Default for EncodeProfiles {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY, DEFAULT_AVIF_QUALITY, DEFAULT_AVIF_EFFORT)
    }
}
