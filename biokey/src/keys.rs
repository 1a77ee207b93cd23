//! Key lifecycle management
//!
//! Owns creation, lookup, and deletion of the one named signing key. All
//! mutations take the shared alias lock, so delete-then-generate is atomic
//! from the caller's perspective and never interleaves with an in-flight
//! signing request.

use std::sync::Arc;

use biokey_store::{pem, KeyPolicy, SecureKeyStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{BridgeError, BridgeResult};

pub struct KeyLifecycleManager {
    store: Arc<dyn SecureKeyStore>,
    alias: String,
    policy: KeyPolicy,
    alias_lock: Arc<Mutex<()>>,
}

impl KeyLifecycleManager {
    pub fn new(
        store: Arc<dyn SecureKeyStore>,
        alias: String,
        policy: KeyPolicy,
        alias_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self { store, alias, policy, alias_lock }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Destroy any existing key under the alias, generate a fresh one, and
    /// return its public key as PEM.
    pub async fn generate_and_public_key_pem(&self) -> BridgeResult<String> {
        let _guard = self.alias_lock.lock().await;

        self.store
            .delete_key(&self.alias)
            .await
            .map_err(BridgeError::from_key_op)?;

        let der = self
            .store
            .generate_signing_key(&self.alias, &self.policy)
            .await
            .map_err(BridgeError::from_key_op)?;

        info!(alias = %self.alias, "signing key regenerated");
        Ok(pem::encode_public_key_pem(&der))
    }

    /// Current public key as PEM, or `None` when no key exists.
    pub async fn public_key_pem(&self) -> BridgeResult<Option<String>> {
        let der = self
            .store
            .public_key_der(&self.alias)
            .await
            .map_err(BridgeError::from_key_op)?;
        Ok(der.map(|d| pem::encode_public_key_pem(&d)))
    }

    /// Remove the key under the alias.
    ///
    /// Returns `true` iff the store confirms deletion or absence; any store
    /// failure yields `false`, never an error.
    pub async fn delete_key(&self) -> bool {
        let _guard = self.alias_lock.lock().await;

        match self.store.delete_key(&self.alias).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                warn!(alias = %self.alias, error = %e, "key deletion failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biokey_store::SoftwareKeyStore;

    fn manager(store: Arc<SoftwareKeyStore>) -> KeyLifecycleManager {
        KeyLifecycleManager::new(
            store,
            "biometric_key_default".to_string(),
            KeyPolicy::default(),
            Arc::new(Mutex::new(())),
        )
    }

    #[tokio::test]
    async fn lookup_before_generate_is_none() {
        let mgr = manager(Arc::new(SoftwareKeyStore::new()));
        assert!(mgr.public_key_pem().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn regenerate_leaves_exactly_one_key() {
        let mgr = manager(Arc::new(SoftwareKeyStore::new()));

        let first = mgr.generate_and_public_key_pem().await.unwrap();
        let second = mgr.generate_and_public_key_pem().await.unwrap();
        assert_ne!(first, second);

        // only the latest key is retrievable
        assert_eq!(mgr.public_key_pem().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn delete_is_true_for_absent_key() {
        let mgr = manager(Arc::new(SoftwareKeyStore::new()));
        assert!(mgr.delete_key().await);

        mgr.generate_and_public_key_pem().await.unwrap();
        assert!(mgr.delete_key().await);
        assert!(mgr.public_key_pem().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn generation_failure_is_key_error() {
        let mgr = manager(Arc::new(SoftwareKeyStore::without_lock_screen()));
        let err = mgr.generate_and_public_key_pem().await.unwrap_err();
        assert_eq!(err.kind(), "key_error");
    }
}
