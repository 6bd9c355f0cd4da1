use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::resolve::OutputFormat;

/// Stage of the per-request pipeline.
///
/// A request moves `Fetching -> Decoding -> Resizing -> Encoding` and either
/// completes or fails in exactly one of these stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetching,
    Decoding,
    Resizing,
    Encoding,
}

impl Stage {
    /// Lowercase name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Decoding => "decoding",
            Stage::Resizing => "resizing",
            Stage::Encoding => "encoding",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors caused by the inbound request itself (maps to HTTP 400)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The `url` query parameter is absent or empty
    #[error("Missing 'url' parameter")]
    MissingUrl,

    /// The `url` query parameter is not an absolute http(s) URL
    #[error("Invalid 'url' parameter: {reason}")]
    InvalidUrl { reason: String },
}

/// Errors that can occur when fetching the source image from the origin
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, connection reset, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The exchange did not finish within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The origin answered with a non-success status
    #[error("Upstream responded with status {status}")]
    Status { status: u16 },

    /// The response body exceeds the configured byte ceiling
    #[error("Upstream body exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

impl FetchError {
    /// Upstream HTTP status, when the origin answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while decoding, resizing or encoding an image
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Bytes are not a recognized or well-formed image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Source image is larger than the decode pixel ceiling
    #[error("Image dimensions {width}x{height} exceed the limit of {max_pixels} pixels")]
    TooManyPixels {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// Resampling failed
    #[error("Failed to resize image: {message}")]
    Resize { message: String },

    /// The codec could not produce the requested format
    #[error("Failed to encode {} image: {message}", format.name())]
    Encode {
        format: OutputFormat,
        message: String,
    },

    /// The blocking transform task panicked or was cancelled
    #[error("Transform task failed: {message}")]
    Worker { message: String },
}

impl CodecError {
    /// Pipeline stage this error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            CodecError::Decode { .. } | CodecError::TooManyPixels { .. } => Stage::Decoding,
            CodecError::Resize { .. } => Stage::Resizing,
            CodecError::Encode { .. } | CodecError::Worker { .. } => Stage::Encoding,
        }
    }
}

/// Any failure of a proxied request.
///
/// Each variant corresponds to one HTTP status class: input errors are the
/// client's fault, upstream errors the origin's, codec errors ours.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Upstream(#[from] FetchError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ProxyError {
    /// Stage the request failed in. Input errors happen before the pipeline starts.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ProxyError::Input(_) => None,
            ProxyError::Upstream(_) => Some(Stage::Fetching),
            ProxyError::Codec(err) => Some(err.stage()),
        }
    }
}
