use crate::crop::{ClipError, MetricsError};
use crate::extract::ExtractError;
use crate::state::StateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    Clip(#[from] ClipError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("no decoded image is available")]
    ImageNotReady,
    #[error("failed to decode image {url}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}
