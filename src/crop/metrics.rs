use thiserror::Error;

use super::Clip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("image has non-positive natural dimensions: {width}x{height}")]
    NonPositiveDimensions { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetrics {
    pub natural_width: u32,
    pub natural_height: u32,
    pub landscape: bool,
    /// `natural_height / natural_width`.
    pub ratio: f64,
    pub max_clip_width: f64,
    pub max_clip_height: f64,
}

impl ImageMetrics {
    pub fn resolve(natural_width: u32, natural_height: u32) -> Result<Self, MetricsError> {
        if natural_width == 0 || natural_height == 0 {
            tracing::warn!(
                natural_width,
                natural_height,
                "refusing to resolve metrics for empty image"
            );
            return Err(MetricsError::NonPositiveDimensions {
                width: natural_width,
                height: natural_height,
            });
        }

        let landscape = natural_width >= natural_height;
        let ratio = f64::from(natural_height) / f64::from(natural_width);
        let (max_clip_width, max_clip_height) = if landscape {
            (ratio, 1.0)
        } else {
            (1.0, 1.0 / ratio)
        };

        tracing::debug!(
            natural_width,
            natural_height,
            landscape,
            ratio,
            "resolved image metrics"
        );
        Ok(Self {
            natural_width,
            natural_height,
            landscape,
            ratio,
            max_clip_width,
            max_clip_height,
        })
    }

    /// Full-image square anchored at the top-left corner.
    pub fn default_clip(&self) -> Clip {
        Clip::new(0.0, 0.0, self.max_clip_width)
    }

    pub fn height_for_width(&self, width: f64) -> f64 {
        width / self.ratio
    }
}
