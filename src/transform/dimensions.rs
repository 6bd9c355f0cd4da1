//! Resize box computation and fit-inside scaling.

use crate::resolve::ResizeTarget;

/// Orientation of a source image.
///
/// Square images count as landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Portrait iff `height > width`.
    pub fn of(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// Bounding box for a fit-inside resize. An unset side is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeBox {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Compute the bounding box for a source of `width` x `height`.
///
/// Returns `None` when the target asks for no resize.
pub fn resize_box(width: u32, height: u32, target: &ResizeTarget) -> Option<ResizeBox> {
    match *target {
        ResizeTarget::Explicit { width, height } => Some(ResizeBox { width, height }),
        ResizeTarget::MaxEdge(edge) => match Orientation::of(width, height) {
            Orientation::Portrait => Some(ResizeBox {
                width: None,
                height: Some(edge),
            }),
            Orientation::Landscape => Some(ResizeBox {
                width: Some(edge),
                height: None,
            }),
        },
        ResizeTarget::Original => None,
    }
}

/// Scale `src_w` x `src_h` to fit inside `bounds`, preserving aspect ratio.
///
/// Never enlarges, and never returns a side below 1 px.
pub fn fit_inside(src_w: u32, src_h: u32, bounds: ResizeBox) -> (u32, u32) {
    let scale_w = bounds.width.map(|w| w as f64 / src_w as f64);
    let scale_h = bounds.height.map(|h| h as f64 / src_h as f64);

    let scale = match (scale_w, scale_h) {
        (Some(w), Some(h)) => w.min(h),
        (Some(w), None) => w,
        (None, Some(h)) => h,
        (None, None) => return (src_w, src_h),
    };

    if scale >= 1.0 {
        return (src_w, src_h);
    }

    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;
    (new_w.max(1), new_h.max(1))
}

/// Final output dimensions for a source under `target`.
pub fn output_dimensions(src_w: u32, src_h: u32, target: &ResizeTarget) -> (u32, u32) {
    match resize_box(src_w, src_h, target) {
        Some(bounds) => fit_inside(src_w, src_h, bounds),
        None => (src_w, src_h),
    }
}
