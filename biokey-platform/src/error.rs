//! Platform-specific error types

use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("platform feature not available: {0}")]
    FeatureNotAvailable(String),

    #[error("authentication ceremony could not start: {0}")]
    CeremonyUnavailable(String),

    #[error("capability probe failed: {0}")]
    ProbeFailed(String),

    #[error("platform API error: {0}")]
    ApiError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
