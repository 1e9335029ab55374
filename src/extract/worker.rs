use std::sync::mpsc;

use super::{Blob, CropExtractor, ExtractError, ImageHandle};
use crate::crop::Clip;

/// Result of an extraction running on a worker thread.
///
/// Dropping it abandons the result; the worker still finishes its encode.
#[derive(Debug)]
pub struct PendingExtraction {
    rx: mpsc::Receiver<Result<Blob, ExtractError>>,
}

impl PendingExtraction {
    /// Non-blocking poll; `None` while the worker is still encoding.
    pub fn try_take(&self) -> Option<Result<Blob, ExtractError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(ExtractError::WorkerDisconnected)),
        }
    }

    pub fn wait(self) -> Result<Blob, ExtractError> {
        self.rx
            .recv()
            .map_err(|_| ExtractError::WorkerDisconnected)?
    }
}

impl CropExtractor {
    pub fn spawn(
        &self,
        image: &ImageHandle,
        clip: Clip,
        mime_type: impl Into<String>,
    ) -> PendingExtraction {
        let extractor = *self;
        let image = image.clone();
        let mime_type = mime_type.into();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = extractor.extract(image.image(), &clip, &mime_type);
            if let Err(err) = &result {
                tracing::warn!(%err, "crop extraction failed");
            }
            let _ = tx.send(result);
        });
        PendingExtraction { rx }
    }
}

/// Crops `image` to `clip` and encodes it as `mime_type` off the calling thread.
pub fn apply_clip_to_image(
    image: &ImageHandle,
    clip: Clip,
    mime_type: impl Into<String>,
) -> PendingExtraction {
    CropExtractor::default().spawn(image, clip, mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbaImage};

    fn handle(width: u32, height: u32) -> ImageHandle {
        ImageHandle::new(DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
    }

    #[test]
    fn background_extraction_yields_square_blob() {
        let pending = apply_clip_to_image(&handle(200, 100), Clip::new(0.0, 0.0, 0.5), "image/png");
        let blob = pending.wait().expect("extraction should succeed");
        let decoded = image::load_from_memory(&blob.bytes).expect("blob should decode");
        assert_eq!(decoded.dimensions(), (100, 100));
    }

    #[test]
    fn background_extraction_uses_clip_value_at_call_time() {
        let mut clip = Clip::new(0.0, 0.0, 0.5);
        let pending = apply_clip_to_image(&handle(200, 100), clip, "image/png");
        clip.width = 0.1;

        let blob = pending.wait().expect("extraction should succeed");
        let decoded = image::load_from_memory(&blob.bytes).expect("blob should decode");
        assert_eq!(decoded.dimensions(), (100, 100));
        assert_eq!(clip.width, 0.1);
    }

    #[test]
    fn background_extraction_reports_errors() {
        let pending = apply_clip_to_image(&handle(200, 100), Clip::new(0.0, 0.0, 0.0), "image/png");
        let err = pending.wait().expect_err("degenerate clip should fail");
        assert!(matches!(err, ExtractError::InvalidClip { .. }));
    }

    #[test]
    fn try_take_eventually_returns_result() {
        let pending = apply_clip_to_image(&handle(40, 40), Clip::new(0.0, 0.0, 1.0), "image/bmp");
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::yield_now();
        };
        let blob = result.expect("extraction should succeed");
        assert_eq!(blob.mime_type, "image/bmp");
    }
}
