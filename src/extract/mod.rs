//! Rasterizes a finished selection into an encoded square image.

mod worker;

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{
    imageops, DynamicImage, GenericImage, GenericImageView, ImageError, ImageFormat, RgbaImage,
};
use thiserror::Error;

use crate::crop::Clip;
use crate::geometry::PixelRect;

pub use worker::{apply_clip_to_image, PendingExtraction};

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Slack for float residue when checking that a clip lies inside the image.
const CLIP_TOLERANCE: f64 = 1e-9;

/// Upper bound on the RGBA surface allocated for one crop, in bytes.
const MAX_SURFACE_BYTES: usize = 1 << 30;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("clip does not select any pixels: {clip:?}")]
    InvalidClip { clip: Clip },
    #[error("cannot allocate a {side}x{side} drawing surface")]
    SurfaceUnavailable { side: u32 },
    #[error("no encoder for mime type {0:?}")]
    UnsupportedMimeType(String),
    #[error("failed to encode cropped image")]
    Encode(#[source] ImageError),
    #[error("encoder produced no data")]
    EmptyEncoding,
    #[error("extraction worker exited without a result")]
    WorkerDisconnected,
}

impl ExtractError {
    /// Encoder failures are sometimes transient; surface and input failures are not.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Encode(_) | Self::EmptyEncoding | Self::WorkerDisconnected
        )
    }
}

/// Decoded source image shared between the editor and extraction workers.
#[derive(Debug, Clone)]
pub struct ImageHandle(Arc<DynamicImage>);

impl ImageHandle {
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.0
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl OutputFormat {
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            "image/bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::WebP => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Encoded crop result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropExtractor {
    jpeg_quality: u8,
}

impl Default for CropExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl CropExtractor {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn extract(
        &self,
        image: &DynamicImage,
        clip: &Clip,
        mime_type: &str,
    ) -> Result<Blob, ExtractError> {
        let format = OutputFormat::from_mime_type(mime_type)
            .ok_or_else(|| ExtractError::UnsupportedMimeType(mime_type.to_string()))?;
        let (natural_width, natural_height) = image.dimensions();
        let rect = source_rect(natural_width, natural_height, clip)?;

        let mut surface = allocate_surface(rect.width)?;
        let source = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height);
        surface
            .copy_from(&*source, 0, 0)
            .map_err(|_| ExtractError::SurfaceUnavailable { side: rect.width })?;

        let bytes = encode(surface, format, self.jpeg_quality)?;
        if bytes.is_empty() {
            tracing::warn!(?format, "encoder returned an empty buffer");
            return Err(ExtractError::EmptyEncoding);
        }
        tracing::debug!(
            x = rect.x,
            y = rect.y,
            side = rect.width,
            bytes = bytes.len(),
            mime_type = format.mime_type(),
            "extracted crop"
        );
        Ok(Blob {
            bytes,
            mime_type: format.mime_type(),
        })
    }
}

/// Pixel square selected by `clip` inside a `natural_width` x `natural_height` image.
///
/// One side length serves both axes because the clip is pixel-square.
pub fn source_rect(
    natural_width: u32,
    natural_height: u32,
    clip: &Clip,
) -> Result<PixelRect, ExtractError> {
    let invalid = || ExtractError::InvalidClip { clip: *clip };
    if ![clip.left, clip.top, clip.width].iter().all(|value| value.is_finite()) {
        return Err(invalid());
    }
    if natural_width == 0 || natural_height == 0 {
        return Err(invalid());
    }

    let width = f64::from(natural_width);
    let height = f64::from(natural_height);
    let clip_height = clip.width * width / height;
    let inside = clip.left >= -CLIP_TOLERANCE
        && clip.top >= -CLIP_TOLERANCE
        && clip.width >= 0.0
        && clip.left + clip.width <= 1.0 + CLIP_TOLERANCE
        && clip.top + clip_height <= 1.0 + CLIP_TOLERANCE;
    if !inside {
        tracing::debug!(?clip, "clip falls outside the image");
        return Err(invalid());
    }

    // Only rounding residue is clamped here.
    let x = (width * clip.left).round().clamp(0.0, width);
    let y = (height * clip.top).round().clamp(0.0, height);
    let side = (width * clip.width)
        .round()
        .min(width - x)
        .min(height - y);
    if side < 1.0 {
        return Err(invalid());
    }

    let side = side as u32;
    Ok(PixelRect::new(x as u32, y as u32, side, side))
}

fn allocate_surface(side: u32) -> Result<RgbaImage, ExtractError> {
    let unavailable = || ExtractError::SurfaceUnavailable { side };
    let len = usize::try_from(side)
        .ok()
        .and_then(|side| side.checked_mul(side))
        .and_then(|pixels| pixels.checked_mul(4))
        .filter(|len| *len <= MAX_SURFACE_BYTES)
        .ok_or_else(unavailable)?;
    RgbaImage::from_raw(side, side, vec![0_u8; len]).ok_or_else(unavailable)
}

fn encode(
    surface: RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ExtractError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(surface).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality);
            rgb.write_with_encoder(encoder).map_err(ExtractError::Encode)?;
        }
        other => {
            DynamicImage::ImageRgba8(surface)
                .write_to(&mut Cursor::new(&mut bytes), other.image_format())
                .map_err(ExtractError::Encode)?;
        }
    }
    Ok(bytes)
}
