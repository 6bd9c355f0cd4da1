//! Configuration management for the resize proxy.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables (`PORT`, plus the `RESIZE_PROXY_` prefix for everything else)
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use resize_proxy::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `PORT` - Server port (default: 3000, non-numeric values fall back to 3000)
//! - `RESIZE_PROXY_HOST` - Server bind address (default: 0.0.0.0)
//! - `RESIZE_PROXY_DEFAULT_MAX_EDGE` - Longer-edge bound without hints (default: 1920)
//! - `RESIZE_PROXY_MAX_SOURCE_BYTES` - Origin body ceiling (default: 25 MiB)
//! - `RESIZE_PROXY_MAX_SOURCE_PIXELS` - Decode pixel ceiling (default: 100M)
//! - `RESIZE_PROXY_FETCH_TIMEOUT_SECS` - Origin fetch timeout (default: 10)
//! - `RESIZE_PROXY_MAX_CONCURRENT_TRANSFORMS` - Transform permits (default: CPU count)
//! - `RESIZE_PROXY_JPEG_QUALITY` - JPEG quality (default: 80)
//! - `RESIZE_PROXY_AVIF_QUALITY` - AVIF quality (default: 50)
//! - `RESIZE_PROXY_AVIF_EFFORT` - AVIF effort 0-9 (default: 4)
//! - `RESIZE_PROXY_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 86400)
//! - `RESIZE_PROXY_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::convert::Infallible;
use std::time::Duration;

use clap::Parser;

use crate::io::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_BYTES};
use crate::proxy::default_transform_concurrency;
use crate::resolve::{
    EncodeProfiles, DEFAULT_AVIF_EFFORT, DEFAULT_AVIF_QUALITY, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_EDGE, MAX_EFFORT, MAX_QUALITY, MIN_QUALITY,
};
use crate::server::DEFAULT_CACHE_MAX_AGE;
use crate::transform::DEFAULT_MAX_SOURCE_PIXELS;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Parse a port, falling back to [`DEFAULT_PORT`] for anything non-numeric.
pub fn parse_port(value: &str) -> Result<u16, Infallible> {
    Ok(value.trim().parse().unwrap_or(DEFAULT_PORT))
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Resize Proxy - On-the-fly image resizing and transcoding.
///
/// Fetches the image named by the `url` query parameter, fits it inside a
/// bounding box chosen from the request hints, and re-encodes it as AVIF,
/// WebP or JPEG according to the client's `Accept` header.
#[derive(Parser, Debug, Clone)]
#[command(name = "resize-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RESIZE_PROXY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT", value_parser = parse_port)]
    pub port: u16,

    // =========================================================================
    // Resize Configuration
    // =========================================================================
    /// Longer-edge bound applied when a request carries no size hints.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_EDGE,
        env = "RESIZE_PROXY_DEFAULT_MAX_EDGE"
    )]
    pub default_max_edge: u32,

    /// Maximum source image size in bytes.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_SOURCE_BYTES,
        env = "RESIZE_PROXY_MAX_SOURCE_BYTES"
    )]
    pub max_source_bytes: u64,

    /// Maximum decoded source size in pixels (width x height).
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_SOURCE_PIXELS,
        env = "RESIZE_PROXY_MAX_SOURCE_PIXELS"
    )]
    pub max_source_pixels: u64,

    /// Origin fetch timeout in seconds.
    #[arg(
        long,
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(),
        env = "RESIZE_PROXY_FETCH_TIMEOUT_SECS"
    )]
    pub fetch_timeout_secs: u64,

    /// Maximum number of transforms running at once.
    #[arg(
        long,
        default_value_t = default_transform_concurrency(),
        env = "RESIZE_PROXY_MAX_CONCURRENT_TRANSFORMS"
    )]
    pub max_concurrent_transforms: usize,

    // =========================================================================
    // Encoding Configuration
    // =========================================================================
    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "RESIZE_PROXY_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// AVIF quality (1-100).
    #[arg(long, default_value_t = DEFAULT_AVIF_QUALITY, env = "RESIZE_PROXY_AVIF_QUALITY")]
    pub avif_quality: u8,

    /// AVIF encoder effort (0 = fastest, 9 = smallest output).
    #[arg(long, default_value_t = DEFAULT_AVIF_EFFORT, env = "RESIZE_PROXY_AVIF_EFFORT")]
    pub avif_effort: u8,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "RESIZE_PROXY_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RESIZE_PROXY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_edge == 0 {
            return Err("default_max_edge must be greater than 0".to_string());
        }
        if self.max_source_bytes == 0 {
            return Err("max_source_bytes must be greater than 0".to_string());
        }
        if self.max_source_pixels == 0 {
            return Err("max_source_pixels must be greater than 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.max_concurrent_transforms == 0 {
            return Err("max_concurrent_transforms must be greater than 0".to_string());
        }

        let quality_range = MIN_QUALITY..=MAX_QUALITY;
        if !quality_range.contains(&self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }
        if !quality_range.contains(&self.avif_quality) {
            return Err("avif_quality must be between 1 and 100".to_string());
        }
        if self.avif_effort > MAX_EFFORT {
            return Err(format!("avif_effort must be between 0 and {}", MAX_EFFORT));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origin fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Encoder settings for every output format.
    pub fn encode_profiles(&self) -> EncodeProfiles {
        EncodeProfiles::new(self.jpeg_quality, self.avif_quality, self.avif_effort)
    }
}

// =============================================================================
// Tests
// =============================================================================
