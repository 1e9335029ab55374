//! Normalized square-selection model and its gesture transforms.

mod clip;
pub mod engine;
mod metrics;

pub use clip::{normalize, Clip, ClipError, PartialClip, ResolvedClip};
pub use metrics::{ImageMetrics, MetricsError};
