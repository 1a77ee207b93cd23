//! Store-specific error types

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("key permanently invalidated: {0}")]
    KeyInvalidated(String),

    #[error("key generation rejected: {0}")]
    GenerationRejected(String),

    #[error("authorization not bound to this operation: {0}")]
    BindingMismatch(String),

    #[error("cryptographic operation failed: {0}")]
    CryptoError(String),

    #[error("secure store error: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
