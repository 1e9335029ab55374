mod pointer;

pub use pointer::{
    DragSession, DragState, DragTarget, NoopCapture, PointerCapture, PointerDragController,
    PointerEvent, PointerId,
};
