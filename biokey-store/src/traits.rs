//! Core store trait definitions

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    types::{AuthorizationToken, KeyPolicy, Signature},
};

/// A named asymmetric signing key inside a platform secure store.
///
/// At most one key exists under an alias at any time. The private key never
/// leaves the store; only the SubjectPublicKeyInfo DER of the public half is
/// exportable.
#[async_trait]
pub trait SecureKeyStore: Send + Sync {
    /// Generate a new EC P-256 signing key pair under `alias`, destroying any
    /// existing key under the same alias first. Returns the public key as
    /// SubjectPublicKeyInfo DER.
    async fn generate_signing_key(&self, alias: &str, policy: &KeyPolicy)
        -> StoreResult<Vec<u8>>;

    /// Public key DER for `alias`, or `None` when no key exists. Absence is
    /// not an error. An invalidated key still answers this lookup, the way
    /// the OS keystore keeps the certificate readable after invalidation.
    async fn public_key_der(&self, alias: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Whether a key exists under `alias` (invalidated entries included).
    async fn contains(&self, alias: &str) -> StoreResult<bool>;

    /// Remove the key under `alias`. Returns `true` when the key was removed
    /// or was already absent; store failures surface as errors.
    async fn delete_key(&self, alias: &str) -> StoreResult<bool>;

    /// Start a sign operation with the key under `alias`.
    ///
    /// Fails with `KeyNotFound` when no key exists under the alias and with
    /// `KeyInvalidated` when the key was destroyed by an enrollment change.
    /// The returned operation must be completed through
    /// [`SignOperation::finish`] with an authorization token bound to it.
    async fn begin_sign(&self, alias: &str) -> StoreResult<Box<dyn SignOperation>>;
}

/// One pending private-key signature, bound to one authentication ceremony.
#[async_trait]
pub trait SignOperation: Send {
    /// Identifier the authentication ceremony must be parameterized with.
    fn id(&self) -> Uuid;

    /// Produce the SHA-256/ECDSA signature over `challenge`.
    ///
    /// Rejects tokens minted for another operation with `BindingMismatch`,
    /// and reports `KeyInvalidated` when the key was invalidated between
    /// `begin_sign` and now.
    async fn finish(
        self: Box<Self>,
        token: &AuthorizationToken,
        challenge: &[u8],
    ) -> StoreResult<Signature>;
}

impl std::fmt::Debug for dyn SignOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOperation").field("id", &self.id()).finish()
    }
}
