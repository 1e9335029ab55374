//! Layout geometry for the crop overlay drawn above the source image.

mod overlay;

pub use overlay::{
    aspect_locked_box, hit_test, overlay_geometry, shade_rects, HandleGeometry, OverlayGeometry,
    DEFAULT_HANDLE_SIZE,
};
