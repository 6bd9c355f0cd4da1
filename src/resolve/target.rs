//! Resize target resolution from device-class hints and explicit dimensions.

use super::format::OutputFormat;

/// Longest edge for `mobile` requests.
pub const MOBILE_MAX_EDGE: u32 = 375;

/// Longest edge for `desktop` requests.
pub const DESKTOP_MAX_EDGE: u32 = 1920;

/// Longest edge for `desktop&portrait` requests.
pub const DESKTOP_PORTRAIT_MAX_EDGE: u32 = 1080;

/// Longest edge applied when no device class is given.
pub const DEFAULT_MAX_EDGE: u32 = 1920;

// =============================================================================
// Resize Target
// =============================================================================

/// How the source image should be constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Caller-supplied box. At least one side is set; an unset side is free.
    Explicit {
        width: Option<u32>,
        height: Option<u32>,
    },

    /// Cap the longer edge of the image.
    MaxEdge(u32),

    /// Keep the source dimensions.
    Original,
}

// =============================================================================
// Request Hints
// =============================================================================

/// Resize-relevant query parameters of a request, unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHints {
    /// Raw `width` parameter
    pub width: Option<String>,

    /// Raw `height` parameter
    pub height: Option<String>,

    /// `mobile` flag present
    pub mobile: bool,

    /// `desktop` flag present
    pub desktop: bool,

    /// `portrait` flag present
    pub portrait: bool,
}

/// Parse a dimension parameter. Anything but a positive integer is `None`.
pub fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

// =============================================================================
// Target Resolver
// =============================================================================

/// Maps request hints to a resize target and output format.
///
/// Pure and cheap to copy; holds only the configured default edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetResolver {
    default_max_edge: u32,
}

impl TargetResolver {
    /// Create a resolver that applies `default_max_edge` when no hint is given.
    pub fn new(default_max_edge: u32) -> Self {
        Self { default_max_edge }
    }

    /// The edge used when the request carries no device class.
    pub fn default_max_edge(&self) -> u32 {
        self.default_max_edge
    }

    /// Resolve the resize target and the output format for a request.
    pub fn resolve(
        &self,
        hints: &RequestHints,
        accept: Option<&str>,
    ) -> (ResizeTarget, OutputFormat) {
        (self.resize_target(hints), OutputFormat::negotiate(accept))
    }

    /// Resolve only the resize target.
    ///
    /// Explicit dimensions win over device-class flags. Among the flags,
    /// `mobile` wins over `desktop`.
    pub fn resize_target(&self, hints: &RequestHints) -> ResizeTarget {
        let width = hints.width.as_deref().and_then(parse_dimension);
        let height = hints.height.as_deref().and_then(parse_dimension);
        if width.is_some() || height.is_some() {
            return ResizeTarget::Explicit { width, height };
        }

        let edge = if hints.mobile {
            MOBILE_MAX_EDGE
        } else if hints.desktop && hints.portrait {
            DESKTOP_PORTRAIT_MAX_EDGE
        } else if hints.desktop {
            DESKTOP_MAX_EDGE
        } else {
            self.default_max_edge
        };
        ResizeTarget::MaxEdge(edge)
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDGE)
    }
}
