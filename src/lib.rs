pub mod config;
pub mod crop;
pub mod editor;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod render;
pub mod state;

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

pub use config::{load_editor_config, EditorConfig};
pub use crop::{Clip, ImageMetrics, PartialClip};
pub use editor::CropEditor;
pub use error::{AppError, AppResult};
pub use extract::{apply_clip_to_image, Blob, CropExtractor, ImageHandle, PendingExtraction};

/// Crops the image at `input` and returns the encoded square.
///
/// Without a `clip` the full-image default selection is used; without a
/// `mime_type` the configured default applies.
pub fn run(input: &Path, clip: Option<&PartialClip>, mime_type: Option<&str>) -> AppResult<Blob> {
    let config = load_editor_config();
    let emitted = Rc::new(Cell::new(None));
    let sink = Rc::clone(&emitted);
    let mut editor = CropEditor::new(crate::input::NoopCapture, &config, move |clip| {
        sink.set(Some(clip));
    });
    editor.load_image_file(input)?;

    let selection = match clip {
        Some(partial) => crop::normalize(Some(partial), editor.metrics())?.clip(),
        None => emitted.get().ok_or(AppError::ImageNotReady)?,
    };
    let mime_type = mime_type.unwrap_or(&config.default_mime_type);
    tracing::info!(
        input = %input.display(),
        left = selection.left,
        top = selection.top,
        width = selection.width,
        mime_type,
        "extracting crop"
    );
    Ok(editor.extract(selection, mime_type)?.wait()?)
}
