//! Request-to-output decisions.
//!
//! Everything in this module is pure: the same hints and `Accept` header always
//! produce the same resize target and output format.
//!
//! # Rules
//!
//! | hints                          | target            |
//! |--------------------------------|-------------------|
//! | `width` and/or `height`        | explicit box      |
//! | `mobile`                       | longest edge 375  |
//! | `desktop&portrait`             | longest edge 1080 |
//! | `desktop`                      | longest edge 1920 |
//! | none                           | configured default|
//!
//! Output format: `image/avif` in `Accept` → AVIF, else `image/webp` → WebP,
//! else JPEG.

mod format;
mod target;

pub use format::{
    EncodeProfile, EncodeProfiles, OutputFormat, DEFAULT_AVIF_EFFORT, DEFAULT_AVIF_QUALITY,
    DEFAULT_JPEG_QUALITY, MAX_EFFORT, MAX_QUALITY, MIN_QUALITY,
};
pub use target::{
    parse_dimension, RequestHints, ResizeTarget, TargetResolver, DEFAULT_MAX_EDGE,
    DESKTOP_MAX_EDGE, DESKTOP_PORTRAIT_MAX_EDGE, MOBILE_MAX_EDGE,
};
