use crate::crop::{engine, Clip, ImageMetrics, ResolvedClip};
use crate::geometry::{DisplaySize, PointerPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub position: PointerPosition,
}

impl PointerEvent {
    pub const fn new(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            position: PointerPosition::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Mask,
    Handle,
}

/// Routes every later event of one pointer device to the interacting element.
///
/// Browser hosts back this with `setPointerCapture`; native toolkits use their own
/// grab mechanism.
pub trait PointerCapture {
    fn capture(&mut self, pointer_id: PointerId);
    fn release(&mut self, pointer_id: PointerId);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapture;

impl PointerCapture for NoopCapture {
    fn capture(&mut self, _pointer_id: PointerId) {}

    fn release(&mut self, _pointer_id: PointerId) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer_id: PointerId,
    pub target: DragTarget,
    pub origin_clip: ResolvedClip,
    pub origin: PointerPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug)]
pub struct PointerDragController<C: PointerCapture> {
    state: DragState,
    capture: C,
}

impl<C: PointerCapture> PointerDragController<C> {
    pub fn new(capture: C) -> Self {
        Self {
            state: DragState::Idle,
            capture,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn capture_backend(&self) -> &C {
        &self.capture
    }

    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        target: DragTarget,
        clip: &ResolvedClip,
    ) -> bool {
        if let DragState::Dragging(session) = &self.state {
            tracing::debug!(
                active = session.pointer_id.0,
                ignored = event.pointer_id.0,
                "pointer down ignored while another drag is active"
            );
            return false;
        }

        self.capture.capture(event.pointer_id);
        self.state = DragState::Dragging(DragSession {
            pointer_id: event.pointer_id,
            target,
            origin_clip: *clip,
            origin: event.position,
        });
        tracing::debug!(pointer_id = event.pointer_id.0, ?target, "drag started");
        true
    }

    pub fn pointer_move(
        &self,
        event: PointerEvent,
        display: DisplaySize,
        metrics: &ImageMetrics,
    ) -> Option<Clip> {
        let session = self.session_for(event.pointer_id)?;
        let delta = event.position.delta_from(session.origin);
        let clip = match session.target {
            DragTarget::Mask => engine::translate(&session.origin_clip, delta, display, metrics),
            DragTarget::Handle => engine::resize(&session.origin_clip, delta, display, metrics),
        };
        Some(clip)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        self.finish(event.pointer_id, "drag finished")
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> bool {
        self.finish(event.pointer_id, "drag cancelled")
    }

    /// The host lost capture for `pointer_id`; the session ends without a release.
    pub fn capture_lost(&mut self, pointer_id: PointerId) -> bool {
        if self.session_for(pointer_id).is_none() {
            return false;
        }
        self.state = DragState::Idle;
        tracing::debug!(pointer_id = pointer_id.0, "drag ended by lost capture");
        true
    }

    /// Ends any active session, releasing its capture.
    pub fn reset(&mut self) {
        if let DragState::Dragging(session) = std::mem::take(&mut self.state) {
            self.capture.release(session.pointer_id);
            tracing::debug!(pointer_id = session.pointer_id.0, "drag reset");
        }
    }

    fn session_for(&self, pointer_id: PointerId) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => Some(session),
            _ => None,
        }
    }

    fn finish(&mut self, pointer_id: PointerId, reason: &'static str) -> bool {
        if self.session_for(pointer_id).is_none() {
            return false;
        }
        self.capture.release(pointer_id);
        self.state = DragState::Idle;
        tracing::debug!(pointer_id = pointer_id.0, "{reason}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingCapture {
        captured: Vec<PointerId>,
        released: Vec<PointerId>,
    }

    impl PointerCapture for RecordingCapture {
        fn capture(&mut self, pointer_id: PointerId) {
            self.captured.push(pointer_id);
        }

        fn release(&mut self, pointer_id: PointerId) {
            self.released.push(pointer_id);
        }
    }

    const A: PointerId = PointerId(1);
    const B: PointerId = PointerId(2);

    fn metrics() -> ImageMetrics {
        ImageMetrics::resolve(200, 100).expect("metrics should resolve")
    }

    fn display() -> DisplaySize {
        DisplaySize::new(400.0, 200.0)
    }

    fn start_clip() -> ResolvedClip {
        Clip::new(0.1, 0.0, 0.25).resolve(&metrics())
    }

    #[test]
    fn pointer_down_captures_device_and_snapshots_origin() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        assert!(controller.pointer_down(
            PointerEvent::new(A, 50.0, 60.0),
            DragTarget::Mask,
            &start_clip()
        ));
        assert_eq!(controller.capture_backend().captured, vec![A]);
        match controller.state() {
            DragState::Dragging(session) => {
                assert_eq!(session.pointer_id, A);
                assert_eq!(session.origin, PointerPosition::new(50.0, 60.0));
                assert_eq!(session.origin_clip, start_clip());
            }
            DragState::Idle => panic!("controller should be dragging"),
        }
    }

    #[test]
    fn second_pointer_down_is_ignored_while_dragging() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Mask, &start_clip());
        assert!(!controller.pointer_down(
            PointerEvent::new(B, 10.0, 10.0),
            DragTarget::Handle,
            &start_clip()
        ));
        assert_eq!(controller.capture_backend().captured, vec![A]);
    }

    #[test]
    fn moves_from_other_pointers_produce_nothing() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Mask, &start_clip());
        assert_eq!(
            controller.pointer_move(PointerEvent::new(B, 40.0, 0.0), display(), &metrics()),
            None
        );
        assert!(!controller.pointer_up(PointerEvent::new(B, 40.0, 0.0)));
        assert!(controller.is_dragging());
    }

    #[test]
    fn moves_are_measured_from_gesture_start() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.pointer_down(PointerEvent::new(A, 100.0, 0.0), DragTarget::Mask, &start_clip());

        let first = controller
            .pointer_move(PointerEvent::new(A, 120.0, 0.0), display(), &metrics())
            .expect("matching pointer should move the clip");
        let second = controller
            .pointer_move(PointerEvent::new(A, 140.0, 0.0), display(), &metrics())
            .expect("matching pointer should move the clip");
        assert!((first.left - 0.15).abs() < 1e-9);
        assert!((second.left - 0.2).abs() < 1e-9);
    }

    #[test]
    fn handle_drag_resizes_instead_of_moving() {
        let mut controller = PointerDragController::new(NoopCapture);
        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Handle, &start_clip());
        let clip = controller
            .pointer_move(PointerEvent::new(A, 40.0, 300.0), display(), &metrics())
            .expect("matching pointer should resize the clip");
        assert_eq!(clip.left, 0.1);
        assert!((clip.width - 0.35).abs() < 1e-9);
    }

    #[test]
    fn pointer_up_releases_capture_and_returns_to_idle() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Mask, &start_clip());
        assert!(controller.pointer_up(PointerEvent::new(A, 5.0, 5.0)));
        assert_eq!(controller.state(), &DragState::Idle);
        assert_eq!(controller.capture_backend().released, vec![A]);
        assert_eq!(
            controller.pointer_move(PointerEvent::new(A, 9.0, 9.0), display(), &metrics()),
            None
        );

        assert!(controller.pointer_down(
            PointerEvent::new(B, 0.0, 0.0),
            DragTarget::Mask,
            &start_clip()
        ));
        assert!(controller.pointer_cancel(PointerEvent::new(B, 0.0, 0.0)));
        assert_eq!(controller.capture_backend().released, vec![A, B]);
    }

    #[test]
    fn lost_capture_ends_session_without_release() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Mask, &start_clip());
        assert!(!controller.capture_lost(B));
        assert!(controller.capture_lost(A));
        assert!(!controller.is_dragging());
        assert!(controller.capture_backend().released.is_empty());
    }

    #[test]
    fn reset_releases_active_capture() {
        let mut controller = PointerDragController::new(RecordingCapture::default());
        controller.reset();
        assert!(controller.capture_backend().released.is_empty());

        controller.pointer_down(PointerEvent::new(A, 0.0, 0.0), DragTarget::Mask, &start_clip());
        controller.reset();
        assert!(!controller.is_dragging());
        assert_eq!(controller.capture_backend().released, vec![A]);
    }
}
