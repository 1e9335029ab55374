//! Controlled crop editor component.
//!
//! The editor never owns the selection. Callers pass the clip they currently hold
//! into each call and receive new clips through the change callback, so there is no
//! internal copy that could drift from theirs. The only state kept here is the image
//! lifecycle, the decoded image and the in-flight drag session.

use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::config::EditorConfig;
use crate::crop::{normalize, Clip, ImageMetrics, PartialClip, ResolvedClip};
use crate::error::{AppError, AppResult};
use crate::extract::{CropExtractor, ImageHandle, PendingExtraction};
use crate::geometry::{DisplaySize, PointerPosition};
use crate::input::{DragTarget, PointerCapture, PointerDragController, PointerEvent, PointerId};
use crate::render::{aspect_locked_box, hit_test, overlay_geometry, OverlayGeometry};
use crate::state::{EditorEvent, EditorState, StateMachine};

type ChangeCallback = Box<dyn FnMut(Clip)>;
type ImageCallback = Box<dyn FnMut(&ImageHandle)>;

struct LoadedImage {
    metrics: ImageMetrics,
    handle: ImageHandle,
}

pub struct CropEditor<C: PointerCapture> {
    lifecycle: StateMachine,
    image_url: Option<String>,
    loaded: Option<LoadedImage>,
    drag: PointerDragController<C>,
    extractor: CropExtractor,
    handle_size: f64,
    on_change: ChangeCallback,
    on_image: Option<ImageCallback>,
}

impl<C: PointerCapture> CropEditor<C> {
    pub fn new(capture: C, config: &EditorConfig, on_change: impl FnMut(Clip) + 'static) -> Self {
        Self {
            lifecycle: StateMachine::new(),
            image_url: None,
            loaded: None,
            drag: PointerDragController::new(capture),
            extractor: CropExtractor::new(config.jpeg_quality),
            handle_size: config.handle_size,
            on_change: Box::new(on_change),
            on_image: None,
        }
    }

    /// Registers a callback receiving the decoded image once it is available.
    pub fn with_image_callback(mut self, on_image: impl FnMut(&ImageHandle) + 'static) -> Self {
        self.on_image = Some(Box::new(on_image));
        self
    }

    pub fn state(&self) -> EditorState {
        self.lifecycle.state()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn metrics(&self) -> Option<&ImageMetrics> {
        self.loaded.as_ref().map(|loaded| &loaded.metrics)
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.loaded.as_ref().map(|loaded| &loaded.handle)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Points the editor at a new image.
    ///
    /// Supplying the current URL again is a no-op unless that image failed, in which
    /// case it is requested again.
    pub fn set_image_url(&mut self, url: impl Into<String>) -> AppResult<bool> {
        let url = url.into();
        let same_url = self.image_url.as_deref() == Some(url.as_str());
        if same_url && self.state() != EditorState::Failed {
            return Ok(false);
        }
        self.request_image(url)?;
        Ok(true)
    }

    fn request_image(&mut self, url: String) -> AppResult<()> {
        self.drag.reset();
        self.loaded = None;
        self.lifecycle.transition(EditorEvent::ImageRequested)?;
        tracing::debug!(%url, "image requested");
        self.image_url = Some(url);
        Ok(())
    }

    fn is_current(&self, url: &str) -> bool {
        if self.image_url.as_deref() == Some(url) {
            return true;
        }
        tracing::debug!(%url, current = ?self.image_url, "ignoring result for stale image");
        false
    }

    /// Host callback for a finished decode of `url`.
    ///
    /// Resolves metrics and emits the full-image default clip.
    pub fn image_decoded(&mut self, url: &str, image: DynamicImage) -> AppResult<()> {
        if !self.is_current(url) {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let metrics = match ImageMetrics::resolve(width, height) {
            Ok(metrics) => metrics,
            Err(err) => {
                self.lifecycle.transition(EditorEvent::ImageFailed)?;
                return Err(err.into());
            }
        };
        self.lifecycle.transition(EditorEvent::ImageDecoded)?;

        let handle = ImageHandle::new(image);
        self.loaded = Some(LoadedImage {
            metrics,
            handle: handle.clone(),
        });
        if let Some(on_image) = self.on_image.as_mut() {
            on_image(&handle);
        }
        (self.on_change)(metrics.default_clip());
        Ok(())
    }

    /// Host callback for a decode of `url` that did not produce an image.
    pub fn image_failed(&mut self, url: &str, message: &str) -> AppResult<()> {
        if !self.is_current(url) {
            return Ok(());
        }
        tracing::warn!(%url, message, "image failed to decode");
        self.lifecycle.transition(EditorEvent::ImageFailed)?;
        self.drag.reset();
        self.loaded = None;
        Ok(())
    }

    /// Requests, decodes and installs an image file in one step.
    pub fn load_image_file(&mut self, path: &Path) -> AppResult<()> {
        let url = path.display().to_string();
        self.request_image(url.clone())?;
        match image::open(path) {
            Ok(image) => self.image_decoded(&url, image),
            Err(source) => {
                self.image_failed(&url, &source.to_string())?;
                Err(AppError::Decode { url, source })
            }
        }
    }

    fn ready_metrics(&self) -> Option<ImageMetrics> {
        if !self.lifecycle.state().accepts_input() {
            return None;
        }
        self.metrics().copied()
    }

    fn resolve(&self, clip: Option<&Clip>) -> AppResult<ResolvedClip> {
        let partial = clip.copied().map(PartialClip::from);
        Ok(normalize(partial.as_ref(), self.metrics())?)
    }

    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        target: DragTarget,
        clip: Option<&Clip>,
    ) -> AppResult<bool> {
        if self.ready_metrics().is_none() {
            tracing::debug!(state = ?self.state(), "pointer down before image is ready");
            return Ok(false);
        }
        let origin = self.resolve(clip)?;
        Ok(self.drag.pointer_down(event, target, &origin))
    }

    /// Feeds a move event; emits and returns `true` when it produced a new clip.
    pub fn pointer_move(&mut self, event: PointerEvent, display: DisplaySize) -> bool {
        let Some(metrics) = self.ready_metrics() else {
            return false;
        };
        match self.drag.pointer_move(event, display, &metrics) {
            Some(clip) => {
                (self.on_change)(clip);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        self.drag.pointer_up(event)
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> bool {
        self.drag.pointer_cancel(event)
    }

    pub fn capture_lost(&mut self, pointer_id: PointerId) -> bool {
        self.drag.capture_lost(pointer_id)
    }

    pub fn overlay(
        &self,
        clip: Option<&Clip>,
        container: DisplaySize,
    ) -> AppResult<OverlayGeometry> {
        let resolved = self.resolve(clip)?;
        Ok(overlay_geometry(&resolved, container, self.handle_size))
    }

    /// Aspect-locked size for the image container, once metrics are known.
    pub fn container_box(&self, available: DisplaySize) -> Option<DisplaySize> {
        self.metrics().map(|metrics| aspect_locked_box(available, metrics))
    }

    /// Drag target under a container-relative point, for hosts without per-element events.
    pub fn target_at(
        &self,
        point: PointerPosition,
        clip: Option<&Clip>,
        container: DisplaySize,
    ) -> AppResult<Option<DragTarget>> {
        let overlay = self.overlay(clip, container)?;
        Ok(hit_test(point, &overlay, container))
    }

    /// Starts extracting `clip` from the decoded image on a worker thread.
    pub fn extract(
        &self,
        clip: Clip,
        mime_type: impl Into<String>,
    ) -> AppResult<PendingExtraction> {
        let loaded = self.loaded.as_ref().ok_or(AppError::ImageNotReady)?;
        Ok(self.extractor.spawn(&loaded.handle, clip, mime_type))
    }
}
