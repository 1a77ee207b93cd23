//! Core error types
//!
//! Every error carries a machine-readable kind (the wire contract's error
//! taxonomy) plus a human-readable message. Nothing here is fatal to the
//! host process; all failures are scoped to a single operation.

use biokey_store::StoreError;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("signing key not found")]
    KeyMissing,

    #[error("key permanently invalidated: {0}")]
    KeyInvalidated(String),

    #[error("key store operation failed: {0}")]
    KeyError(String),

    #[error("signing failed: {0}")]
    SignError(String),

    #[error("a signing request is already pending")]
    Busy,

    #[error("fingerprint probe failed: {0}")]
    Fingerprint(String),

    #[error("face probe failed: {0}")]
    Face(String),

    #[error("diagnostics failed: {0}")]
    Diagnostics(String),

    #[error("method not implemented: {0}")]
    NotImplemented(String),
}

impl BridgeError {
    /// Machine-readable error kind reported on the channel.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgs(_) => "invalid_args",
            Self::KeyMissing => "key_missing",
            Self::KeyInvalidated(_) => "key_invalidated",
            Self::KeyError(_) => "key_error",
            // an overlapping request terminates like any other ceremony error
            Self::SignError(_) | Self::Busy => "sign_error",
            Self::Fingerprint(_) => "fp_error",
            Self::Face(_) => "face_error",
            Self::Diagnostics(_) => "diag_error",
            Self::NotImplemented(_) => "not_implemented",
        }
    }

    /// Map a store failure raised by a key-lifecycle operation.
    pub(crate) fn from_key_op(err: StoreError) -> Self {
        match err {
            StoreError::KeyInvalidated(msg) => Self::KeyInvalidated(msg),
            other => Self::KeyError(other.to_string()),
        }
    }

    /// Map a store failure raised while preparing or finishing a signature.
    pub(crate) fn from_sign_op(err: StoreError) -> Self {
        match err {
            StoreError::KeyNotFound(_) => Self::KeyMissing,
            StoreError::KeyInvalidated(msg) => Self::KeyInvalidated(msg),
            other => Self::SignError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_wire_taxonomy() {
        assert_eq!(BridgeError::InvalidArgs("x".into()).kind(), "invalid_args");
        assert_eq!(BridgeError::KeyMissing.kind(), "key_missing");
        assert_eq!(BridgeError::KeyInvalidated("x".into()).kind(), "key_invalidated");
        assert_eq!(BridgeError::KeyError("x".into()).kind(), "key_error");
        assert_eq!(BridgeError::SignError("x".into()).kind(), "sign_error");
        assert_eq!(BridgeError::Busy.kind(), "sign_error");
    }

    #[test]
    fn store_errors_map_by_context() {
        let missing = StoreError::KeyNotFound("k".into());
        assert!(matches!(BridgeError::from_sign_op(missing), BridgeError::KeyMissing));

        let invalidated = StoreError::KeyInvalidated("k".into());
        assert!(matches!(BridgeError::from_sign_op(invalidated), BridgeError::KeyInvalidated(_)));

        let rejected = StoreError::GenerationRejected("no lock screen".into());
        assert!(matches!(BridgeError::from_key_op(rejected), BridgeError::KeyError(_)));
    }
}
