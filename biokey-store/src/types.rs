//! Store types and data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

/// Policy attached to a signing key at generation time.
///
/// Mirrors the secure-store key-generation parameters: the key is usable for
/// signing only, every use requires a fresh user authentication, and an
/// enrollment change destroys the key's usability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPolicy {
    /// Require a successful user authentication immediately before each use.
    /// No cached-authentication window.
    pub require_user_auth: bool,

    /// Permanently invalidate the key when the enrolled biometric template
    /// set changes.
    pub invalidated_by_enrollment_change: bool,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self { require_user_auth: true, invalidated_by_enrollment_change: true }
    }
}

/// Proof that an authentication ceremony completed for one specific pending
/// sign operation.
///
/// The token is only accepted by the operation whose id it carries. A token
/// minted for a different operation (or none at all) must never authorize a
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationToken {
    operation_id: Uuid,
}

impl AuthorizationToken {
    pub fn for_operation(operation_id: Uuid) -> Self {
        Self { operation_id }
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }
}

/// An ECDSA signature produced by the store. Zeroed on drop.
#[derive(Debug, Clone)]
pub struct Signature {
    data: Vec<u8>,
}

impl Signature {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

impl Zeroize for Signature {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

impl Drop for Signature {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_auth_gated() {
        let policy = KeyPolicy::default();
        assert!(policy.require_user_auth);
        assert!(policy.invalidated_by_enrollment_change);
    }

    #[test]
    fn token_carries_operation_id() {
        let id = Uuid::new_v4();
        let token = AuthorizationToken::for_operation(id);
        assert_eq!(token.operation_id(), id);
    }
}
