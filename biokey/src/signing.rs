//! Biometric-gated challenge signing
//!
//! One signing request runs the state machine pending → signing →
//! succeeded/failed. The request stays pending across failed recognition
//! attempts; only an explicit ceremony error, cancel, lockout, or key
//! invalidation terminates it. Signing happens exclusively as the direct
//! continuation of a ceremony success whose authorization token is bound to
//! this request's sign operation.

use std::sync::Arc;

use biokey_platform::{BiometricAuthenticator, CeremonyEvent, CeremonyRequest, PromptSpec};
use biokey_store::SecureKeyStore;
use tokio::sync::{oneshot, Mutex, Semaphore};
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};

/// Handle to a submitted signing request. The terminal outcome arrives
/// exactly once through [`SigningTicket::outcome`].
#[derive(Debug)]
pub struct SigningTicket {
    rx: oneshot::Receiver<BridgeResult<Vec<u8>>>,
}

impl SigningTicket {
    /// Wait for the request's terminal outcome: the raw ECDSA signature
    /// bytes, or the failure that ended the request.
    pub async fn outcome(self) -> BridgeResult<Vec<u8>> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(BridgeError::SignError("signing task dropped".into())))
    }
}

/// Orchestrates biometric-gated signing with the configured key.
pub struct SigningProtocol {
    store: Arc<dyn SecureKeyStore>,
    authenticator: Arc<dyn BiometricAuthenticator>,
    alias: String,
    prompt: PromptSpec,
    alias_lock: Arc<Mutex<()>>,
    inflight: Arc<Semaphore>,
}

impl SigningProtocol {
    pub fn new(
        store: Arc<dyn SecureKeyStore>,
        authenticator: Arc<dyn BiometricAuthenticator>,
        alias: String,
        prompt: PromptSpec,
        alias_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            store,
            authenticator,
            alias,
            prompt,
            alias_lock,
            inflight: Arc::new(Semaphore::new(1)),
        }
    }

    /// Submit a challenge for signing.
    ///
    /// Returns immediately with a ticket; the ceremony runs on a background
    /// task. At most one request may be in flight: a second submission is
    /// rejected rather than starting an overlapping ceremony.
    pub fn submit(&self, challenge: Vec<u8>) -> BridgeResult<SigningTicket> {
        let permit = Arc::clone(&self.inflight)
            .try_acquire_owned()
            .map_err(|_| BridgeError::Busy)?;

        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let authenticator = Arc::clone(&self.authenticator);
        let alias = self.alias.clone();
        let prompt = self.prompt.clone();
        let alias_lock = Arc::clone(&self.alias_lock);

        tokio::spawn(async move {
            let outcome =
                run_request(store, authenticator, alias, prompt, alias_lock, challenge).await;
            drop(permit);
            let _ = tx.send(outcome);
        });

        Ok(SigningTicket { rx })
    }

    /// Submit a challenge and wait for the terminal outcome.
    pub async fn sign(&self, challenge: Vec<u8>) -> BridgeResult<Vec<u8>> {
        self.submit(challenge)?.outcome().await
    }
}

async fn run_request(
    store: Arc<dyn SecureKeyStore>,
    authenticator: Arc<dyn BiometricAuthenticator>,
    alias: String,
    prompt: PromptSpec,
    alias_lock: Arc<Mutex<()>>,
    challenge: Vec<u8>,
) -> BridgeResult<Vec<u8>> {
    // Held for the whole request: generate/delete must not race an
    // in-flight sign.
    let _guard = alias_lock.lock_owned().await;

    let op = store
        .begin_sign(&alias)
        .await
        .map_err(BridgeError::from_sign_op)?;

    let request = CeremonyRequest { operation_id: op.id(), prompt };
    let mut events = authenticator
        .begin_ceremony(request)
        .await
        .map_err(|e| BridgeError::SignError(e.to_string()))?;

    let mut op = Some(op);
    let mut attempts: u32 = 0;
    loop {
        match events.recv().await {
            // non-terminal: the OS prompt stays up, the user may retry
            Some(CeremonyEvent::AttemptFailed) => {
                attempts += 1;
                debug!(alias = %alias, attempts, "recognition attempt failed, request stays pending");
            }
            Some(CeremonyEvent::Succeeded(token)) => {
                let Some(op) = op.take() else {
                    // a second success event after the terminal transition
                    return Err(BridgeError::SignError("request already completed".into()));
                };
                debug!(alias = %alias, operation = %token.operation_id(), "ceremony succeeded, signing");
                let signature = op
                    .finish(&token, &challenge)
                    .await
                    .map_err(BridgeError::from_sign_op)?;
                return Ok(signature.into_bytes());
            }
            Some(CeremonyEvent::Error(e)) => {
                warn!(alias = %alias, error = %e, "ceremony ended with error");
                return Err(BridgeError::SignError(e.to_string()));
            }
            Some(CeremonyEvent::KeyInvalidated) => {
                warn!(alias = %alias, "key invalidated during ceremony");
                return Err(BridgeError::KeyInvalidated(alias.clone()));
            }
            None => {
                return Err(BridgeError::SignError(
                    "authentication ceremony ended without a result".into(),
                ));
            }
        }
    }
}
