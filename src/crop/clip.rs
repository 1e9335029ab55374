use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ImageMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("cannot normalize a clip before image metrics are known")]
    MissingMetrics,
}

/// Square selection in normalized image coordinates.
///
/// `left` and `width` are fractions of the natural width, `top` a fraction of the
/// natural height. The height is never stored: it always follows from `width` and
/// the image ratio, which keeps the selection pixel-square.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clip {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

impl Clip {
    pub const fn new(left: f64, top: f64, width: f64) -> Self {
        Self { left, top, width }
    }

    pub fn height(&self, metrics: &ImageMetrics) -> f64 {
        metrics.height_for_width(self.width)
    }

    pub fn resolve(&self, metrics: &ImageMetrics) -> ResolvedClip {
        ResolvedClip::from_parts(self.left, self.top, self.width, metrics)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialClip {
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
}

impl From<Clip> for PartialClip {
    fn from(clip: Clip) -> Self {
        Self {
            left: Some(clip.left),
            top: Some(clip.top),
            width: Some(clip.width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedClip {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ResolvedClip {
    fn from_parts(left: f64, top: f64, width: f64, metrics: &ImageMetrics) -> Self {
        Self {
            left,
            top,
            width,
            height: metrics.height_for_width(width),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub const fn clip(&self) -> Clip {
        Clip::new(self.left, self.top, self.width)
    }
}

impl From<ResolvedClip> for Clip {
    fn from(resolved: ResolvedClip) -> Self {
        resolved.clip()
    }
}

fn field_or_zero(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Completes a possibly-partial selection against the current image.
///
/// Missing fields count as `0`; a missing clip is the all-zero clip.
pub fn normalize(
    clip: Option<&PartialClip>,
    metrics: Option<&ImageMetrics>,
) -> Result<ResolvedClip, ClipError> {
    let metrics = metrics.ok_or(ClipError::MissingMetrics)?;
    let clip = clip.copied().unwrap_or_default();
    Ok(ResolvedClip::from_parts(
        field_or_zero(clip.left),
        field_or_zero(clip.top),
        field_or_zero(clip.width),
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape() -> ImageMetrics {
        ImageMetrics::resolve(200, 100).expect("metrics should resolve")
    }

    #[test]
    fn normalize_fills_height_from_ratio() {
        let partial = PartialClip::from(Clip::new(0.25, 0.0, 0.5));
        let resolved = normalize(Some(&partial), Some(&landscape())).expect("should normalize");
        assert_eq!(resolved.left, 0.25);
        assert_eq!(resolved.width, 0.5);
        assert_eq!(resolved.height, 1.0);
        assert_eq!(resolved.right(), 0.75);
    }

    #[test]
    fn normalize_treats_missing_fields_as_zero() {
        let partial = PartialClip {
            left: None,
            top: Some(0.1),
            width: None,
        };
        let resolved = normalize(Some(&partial), Some(&landscape())).expect("should normalize");
        assert_eq!(
            resolved,
            ResolvedClip {
                left: 0.0,
                top: 0.1,
                width: 0.0,
                height: 0.0
            }
        );

        let empty = normalize(None, Some(&landscape())).expect("should normalize");
        assert_eq!(empty.clip(), Clip::default());
    }

    #[test]
    fn normalize_without_metrics_is_a_precondition_failure() {
        let err = normalize(None, None).expect_err("metrics are required");
        assert_eq!(err, ClipError::MissingMetrics);
    }

    #[test]
    fn partial_clip_accepts_null_and_missing_json_fields() {
        let partial: PartialClip =
            serde_json::from_str(r#"{"left": null, "width": 0.5}"#).expect("json should parse");
        assert_eq!(partial.left, None);
        assert_eq!(partial.top, None);
        assert_eq!(partial.width, Some(0.5));
    }

    #[test]
    fn clip_serializes_without_height() {
        let json = serde_json::to_value(Clip::new(0.0, 0.25, 0.5)).expect("clip should serialize");
        assert_eq!(json, serde_json::json!({"left": 0.0, "top": 0.25, "width": 0.5}));
    }
}
