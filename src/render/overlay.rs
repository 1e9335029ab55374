use crate::crop::{ImageMetrics, ResolvedClip};
use crate::geometry::{DisplaySize, PercentRect, PointerPosition};
use crate::input::DragTarget;

pub const DEFAULT_HANDLE_SIZE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleGeometry {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl HandleGeometry {
    pub fn center(&self) -> PointerPosition {
        let half = self.size / 2.0;
        PointerPosition::new(self.left + half, self.top + half)
    }

    pub fn contains(&self, point: PointerPosition) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.size
            && point.y >= self.top
            && point.y <= self.top + self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    pub mask: PercentRect,
    pub handle: HandleGeometry,
}

fn to_percent(value: f64) -> f64 {
    value * 100.0
}

fn mask_rect(clip: &ResolvedClip) -> PercentRect {
    PercentRect::new(
        to_percent(clip.left),
        to_percent(clip.top),
        to_percent(clip.width),
        to_percent(clip.height),
    )
}

pub fn overlay_geometry(
    clip: &ResolvedClip,
    container: DisplaySize,
    handle_size: f64,
) -> OverlayGeometry {
    let handle_size = handle_size.max(0.0);
    let half = handle_size / 2.0;
    let corner_x = clip.right() * container.width;
    let corner_y = clip.bottom() * container.height;
    OverlayGeometry {
        mask: mask_rect(clip),
        handle: HandleGeometry {
            left: corner_x - half,
            top: corner_y - half,
            size: handle_size,
        },
    }
}

/// Largest box with the image's aspect ratio fitting `available`.
///
/// An unbounded side is derived from the other one.
pub fn aspect_locked_box(available: DisplaySize, metrics: &ImageMetrics) -> DisplaySize {
    let height_limited = available.height.is_finite() && available.height > 0.0;
    if !available.width.is_finite() {
        return if height_limited {
            DisplaySize::new(available.height / metrics.ratio, available.height)
        } else {
            DisplaySize::new(0.0, 0.0)
        };
    }

    let width = available.width.max(0.0);
    let height = width * metrics.ratio;
    if height_limited && height > available.height {
        DisplaySize::new(available.height / metrics.ratio, available.height)
    } else {
        DisplaySize::new(width, height)
    }
}

pub fn shade_rects(clip: &ResolvedClip) -> [PercentRect; 4] {
    let mask = mask_rect(clip);
    let right = mask.left + mask.width;
    let bottom = mask.top + mask.height;
    [
        PercentRect::new(0.0, 0.0, 100.0, mask.top.max(0.0)),
        PercentRect::new(0.0, bottom, 100.0, (100.0 - bottom).max(0.0)),
        PercentRect::new(0.0, mask.top, mask.left.max(0.0), mask.height.max(0.0)),
        PercentRect::new(right, mask.top, (100.0 - right).max(0.0), mask.height.max(0.0)),
    ]
}

/// Picks the drag target under a container-relative point; the handle wins.
pub fn hit_test(
    point: PointerPosition,
    overlay: &OverlayGeometry,
    container: DisplaySize,
) -> Option<DragTarget> {
    if overlay.handle.contains(point) {
        return Some(DragTarget::Handle);
    }
    if !container.is_usable() {
        return None;
    }
    let x = to_percent(point.x / container.width);
    let y = to_percent(point.y / container.height);
    overlay
        .mask
        .contains_percent(x, y)
        .then_some(DragTarget::Mask)
}
