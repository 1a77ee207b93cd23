//! Software key store backed by ring
//!
//! Stand-in for the platform secure store on hosts without one, and the
//! store used by the test suite. It reproduces the observable keystore
//! semantics the bridge depends on: one key per alias, delete-on-regenerate,
//! permanent invalidation on enrollment change (with the public key still
//! readable afterwards), and signing gated on an operation-bound
//! authorization token.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ring::rand::SystemRandom;
use ring::signature::{self, KeyPair};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{StoreError, StoreResult},
    traits::{SecureKeyStore, SignOperation},
    types::{AuthorizationToken, KeyPolicy, Signature},
};

/// DER SubjectPublicKeyInfo framing for an uncompressed P-256 point:
/// SEQUENCE { AlgorithmIdentifier { ecPublicKey, prime256v1 }, BIT STRING }.
const P256_SPKI_PREFIX: &[u8] = &[
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

const P256_POINT_LEN: usize = 65;

/// Wrap an uncompressed P-256 public point into SubjectPublicKeyInfo DER.
pub fn wrap_p256_public_point(point: &[u8]) -> StoreResult<Vec<u8>> {
    if point.len() != P256_POINT_LEN || point[0] != 0x04 {
        return Err(StoreError::CryptoError("not an uncompressed P-256 point".into()));
    }
    let mut der = Vec::with_capacity(P256_SPKI_PREFIX.len() + point.len());
    der.extend_from_slice(P256_SPKI_PREFIX);
    der.extend_from_slice(point);
    Ok(der)
}

/// Extract the uncompressed public point from P-256 SubjectPublicKeyInfo DER.
pub fn unwrap_p256_public_point(der: &[u8]) -> StoreResult<Vec<u8>> {
    let point = der
        .strip_prefix(P256_SPKI_PREFIX)
        .ok_or_else(|| StoreError::CryptoError("not a P-256 SubjectPublicKeyInfo".into()))?;
    if point.len() != P256_POINT_LEN {
        return Err(StoreError::CryptoError("truncated P-256 point".into()));
    }
    Ok(point.to_vec())
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct SoftKey {
    pkcs8: Vec<u8>,
    #[zeroize(skip)]
    public_point: Vec<u8>,
    #[zeroize(skip)]
    policy: KeyPolicy,
    #[zeroize(skip)]
    invalidated: bool,
}

/// Software implementation of [`SecureKeyStore`] using P-256 ECDSA.
pub struct SoftwareKeyStore {
    keys: Arc<Mutex<HashMap<String, SoftKey>>>,
    /// The secure store refuses key generation without a configured lock
    /// screen; toggled off in tests that exercise the rejection path.
    lock_screen_configured: bool,
}

impl SoftwareKeyStore {
    pub fn new() -> Self {
        info!("initializing software key store");
        Self { keys: Arc::new(Mutex::new(HashMap::new())), lock_screen_configured: true }
    }

    /// A store on a device without a lock screen; key generation is rejected.
    pub fn without_lock_screen() -> Self {
        Self { keys: Arc::new(Mutex::new(HashMap::new())), lock_screen_configured: false }
    }

    /// Simulate a change to the enrolled biometric template set.
    ///
    /// Keys whose policy requests it become permanently unusable for
    /// signing. Their public halves stay readable until deleted, matching
    /// keystore behavior where the certificate outlives the key's validity.
    pub async fn record_enrollment_change(&self) {
        let mut keys = self.keys.lock().await;
        for (alias, key) in keys.iter_mut() {
            if key.policy.invalidated_by_enrollment_change && !key.invalidated {
                warn!(alias, "key invalidated by enrollment change");
                key.invalidated = true;
            }
        }
    }
}

impl Default for SoftwareKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureKeyStore for SoftwareKeyStore {
    async fn generate_signing_key(
        &self,
        alias: &str,
        policy: &KeyPolicy,
    ) -> StoreResult<Vec<u8>> {
        if !self.lock_screen_configured {
            return Err(StoreError::GenerationRejected(
                "secure lock screen not configured".into(),
            ));
        }

        let rng = SystemRandom::new();
        let doc = signature::EcdsaKeyPair::generate_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &rng,
        )
        .map_err(|e| StoreError::CryptoError(e.to_string()))?;
        let key_pair = signature::EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            doc.as_ref(),
            &rng,
        )
        .map_err(|e| StoreError::CryptoError(e.to_string()))?;

        let public_point = key_pair.public_key().as_ref().to_vec();
        let der = wrap_p256_public_point(&public_point)?;

        let soft_key = SoftKey {
            pkcs8: doc.as_ref().to_vec(),
            public_point,
            policy: policy.clone(),
            invalidated: false,
        };

        // insert replaces any prior key under the alias
        let replaced = self.keys.lock().await.insert(alias.to_string(), soft_key).is_some();
        info!(alias, replaced, "generated signing key");

        Ok(der)
    }

    async fn public_key_der(&self, alias: &str) -> StoreResult<Option<Vec<u8>>> {
        let keys = self.keys.lock().await;
        match keys.get(alias) {
            Some(key) => Ok(Some(wrap_p256_public_point(&key.public_point)?)),
            None => Ok(None),
        }
    }

    async fn contains(&self, alias: &str) -> StoreResult<bool> {
        Ok(self.keys.lock().await.contains_key(alias))
    }

    async fn delete_key(&self, alias: &str) -> StoreResult<bool> {
        let removed = self.keys.lock().await.remove(alias).is_some();
        debug!(alias, removed, "delete key");
        Ok(true)
    }

    async fn begin_sign(&self, alias: &str) -> StoreResult<Box<dyn SignOperation>> {
        let keys = self.keys.lock().await;
        let key = keys
            .get(alias)
            .ok_or_else(|| StoreError::KeyNotFound(alias.to_string()))?;
        if key.invalidated {
            return Err(StoreError::KeyInvalidated(alias.to_string()));
        }

        let op = SoftwareSignOperation {
            id: Uuid::new_v4(),
            alias: alias.to_string(),
            keys: Arc::clone(&self.keys),
        };
        debug!(alias, operation = %op.id, "sign operation started");
        Ok(Box::new(op))
    }
}

struct SoftwareSignOperation {
    id: Uuid,
    alias: String,
    keys: Arc<Mutex<HashMap<String, SoftKey>>>,
}

#[async_trait]
impl SignOperation for SoftwareSignOperation {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn finish(
        self: Box<Self>,
        token: &AuthorizationToken,
        challenge: &[u8],
    ) -> StoreResult<Signature> {
        if token.operation_id() != self.id {
            return Err(StoreError::BindingMismatch(format!(
                "token authorizes operation {}, not {}",
                token.operation_id(),
                self.id
            )));
        }

        // Re-read the entry: the key may have been invalidated or removed
        // while the ceremony was in flight.
        let keys = self.keys.lock().await;
        let key = keys
            .get(&self.alias)
            .ok_or_else(|| StoreError::KeyNotFound(self.alias.clone()))?;
        if key.invalidated {
            return Err(StoreError::KeyInvalidated(self.alias.clone()));
        }

        let rng = SystemRandom::new();
        let key_pair = signature::EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &key.pkcs8,
            &rng,
        )
        .map_err(|e| StoreError::CryptoError(e.to_string()))?;

        let sig = key_pair
            .sign(&rng, challenge)
            .map_err(|e| StoreError::CryptoError(e.to_string()))?;

        debug!(alias = %self.alias, operation = %self.id, "sign operation completed");
        Ok(Signature::new(sig.as_ref().to_vec()))
    }
}
