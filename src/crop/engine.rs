//! Pure clip transforms for the two crop gestures.
//!
//! Both transforms are anchored on the clip snapshot taken when the gesture began and
//! take the total pointer travel since then, so many small move events never compound
//! rounding error. Pixel travel is divided by the displayed element size, which keeps
//! the gesture independent of how large the image is currently drawn.

use super::{Clip, ImageMetrics, ResolvedClip};
use crate::geometry::{DisplaySize, PointerDelta};

/// Moves the selection without changing its size.
pub fn translate(
    origin: &ResolvedClip,
    delta: PointerDelta,
    display: DisplaySize,
    metrics: &ImageMetrics,
) -> Clip {
    if !display.is_usable() {
        let DisplaySize { width, height } = display;
        tracing::debug!(width, height, "ignoring translate against unusable display size");
        return origin.clip();
    }

    let height = metrics.height_for_width(origin.width);
    let left = origin.left + finite_or_zero(delta.dx) / display.width;
    let top = origin.top + finite_or_zero(delta.dy) / display.height;
    Clip::new(
        clamp_axis(left, 1.0 - origin.width),
        clamp_axis(top, 1.0 - height),
        origin.width,
    )
}

/// Grows or shrinks the selection from its fixed top-left corner.
///
/// Only horizontal travel is used; the height follows through the image ratio.
pub fn resize(
    origin: &ResolvedClip,
    delta: PointerDelta,
    display: DisplaySize,
    metrics: &ImageMetrics,
) -> Clip {
    if !display.is_usable() {
        let DisplaySize { width, height } = display;
        tracing::debug!(width, height, "ignoring resize against unusable display size");
        return origin.clip();
    }

    let candidate = origin.width + finite_or_zero(delta.dx) / display.width;
    let width = candidate.clamp(0.0, max_width_from(origin, metrics));
    Clip::new(origin.left, origin.top, width)
}

/// Largest width that keeps a square anchored at `origin`'s corner inside the image.
pub fn max_width_from(origin: &ResolvedClip, metrics: &ImageMetrics) -> f64 {
    let horizontal_room = 1.0 - origin.left;
    let vertical_room = (1.0 - origin.top) * metrics.ratio;
    horizontal_room.min(vertical_room).max(0.0)
}

fn clamp_axis(value: f64, upper: f64) -> f64 {
    value.clamp(0.0, upper.max(0.0))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
