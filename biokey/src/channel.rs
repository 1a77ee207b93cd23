//! Channel dispatcher
//!
//! Channel-agnostic request/response surface of the bridge: a method name
//! plus JSON arguments in, a JSON success value or a `{kind, message}` error
//! out. This is the contract the application shell's message channel
//! marshals across.

use std::sync::Arc;

use base64::Engine;
use biokey_platform::mock::{
    MockFaceProbe, MockFingerprintProbe, MockStrongQuery, ScriptedAuthenticator, StaticRedirect,
};
use biokey_platform::{
    BiometricAuthenticator, CanAuthenticate, EnrollmentRedirect, FaceHardwareProbe,
    FingerprintProbe, StrongBiometricQuery,
};
use biokey_store::{SecureKeyStore, SoftwareKeyStore};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    capability::CapabilityService,
    config::BridgeConfig,
    error::{BridgeError, BridgeResult},
    keys::KeyLifecycleManager,
    signing::SigningProtocol,
};

/// Method names understood by the dispatcher.
pub mod methods {
    pub const GENERATE_AND_GET_PUBLIC_KEY_PEM: &str = "generateAndGetPublicKeyPem";
    pub const GET_PUBLIC_KEY_PEM: &str = "getPublicKeyPem";
    pub const DELETE_LOCAL_KEY: &str = "deleteLocalKey";
    pub const SIGN_CHALLENGE: &str = "signChallenge";
    pub const IS_FINGERPRINT_ENROLLED: &str = "isFingerprintEnrolled";
    pub const GET_FACE_STATUS: &str = "getFaceStatus";
    pub const GET_FACE_DIAGNOSTICS: &str = "getFaceDiagnostics";
    pub const OPEN_BIOMETRIC_ENROLL: &str = "openBiometricEnroll";
}

/// Wire form of a failed call.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&BridgeError> for ChannelFailure {
    fn from(err: &BridgeError) -> Self {
        Self { kind: err.kind(), message: err.to_string() }
    }
}

/// The bridge's method-channel handler.
pub struct BiometricChannel {
    config: BridgeConfig,
    keys: KeyLifecycleManager,
    signing: SigningProtocol,
    capabilities: CapabilityService,
    redirect: Arc<dyn EnrollmentRedirect>,
}

impl BiometricChannel {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    pub fn channel_name(&self) -> &str {
        &self.config.channel_name
    }

    pub fn keys(&self) -> &KeyLifecycleManager {
        &self.keys
    }

    pub fn signing(&self) -> &SigningProtocol {
        &self.signing
    }

    pub fn capabilities(&self) -> &CapabilityService {
        &self.capabilities
    }

    /// Dispatch one call. The future resolves with the call's terminal
    /// result; for `signChallenge` that means after the authentication
    /// ceremony reports its outcome.
    pub async fn handle(&self, method: &str, args: &Value) -> BridgeResult<Value> {
        debug!(method, "channel call");
        match method {
            methods::GENERATE_AND_GET_PUBLIC_KEY_PEM => {
                let pem = self.keys.generate_and_public_key_pem().await?;
                Ok(Value::String(pem))
            }
            methods::GET_PUBLIC_KEY_PEM => match self.keys.public_key_pem().await? {
                Some(pem) => Ok(Value::String(pem)),
                None => Ok(Value::Null),
            },
            methods::DELETE_LOCAL_KEY => Ok(Value::Bool(self.keys.delete_key().await)),
            methods::SIGN_CHALLENGE => {
                let challenge = Self::parse_challenge(args)?;
                let signature = self.signing.sign(challenge).await?;
                Ok(Value::String(
                    base64::engine::general_purpose::STANDARD.encode(signature),
                ))
            }
            methods::IS_FINGERPRINT_ENROLLED => {
                Ok(Value::Bool(self.capabilities.fingerprint_enrolled()))
            }
            methods::GET_FACE_STATUS => {
                Ok(Value::String(self.capabilities.face_status().as_str().to_string()))
            }
            methods::GET_FACE_DIAGNOSTICS => Ok(self.capabilities.diagnostics()),
            methods::OPEN_BIOMETRIC_ENROLL => Ok(Value::Bool(self.redirect.open_enroll())),
            other => Err(BridgeError::NotImplemented(other.to_string())),
        }
    }

    /// Like [`handle`](Self::handle), with failures already in wire form.
    pub async fn handle_call(&self, method: &str, args: &Value) -> Result<Value, ChannelFailure> {
        self.handle(method, args).await.map_err(|e| ChannelFailure::from(&e))
    }

    /// Validated before any ceremony starts: a malformed challenge must not
    /// cause an OS prompt.
    fn parse_challenge(args: &Value) -> BridgeResult<Vec<u8>> {
        let challenge = args
            .get("challenge")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if challenge.trim().is_empty() {
            return Err(BridgeError::InvalidArgs("challenge missing".into()));
        }
        base64::engine::general_purpose::STANDARD
            .decode(challenge)
            .map_err(|_| BridgeError::InvalidArgs("challenge base64 invalid".into()))
    }
}

/// Builder wiring the bridge's collaborators together.
///
/// Defaults assemble a host-only bridge: software key store, an
/// authenticator that approves without a prompt, and probes reporting no
/// biometric hardware. Production shells replace each part with the
/// OS-backed implementation.
pub struct BridgeBuilder {
    config: BridgeConfig,
    store: Option<Arc<dyn SecureKeyStore>>,
    authenticator: Option<Arc<dyn BiometricAuthenticator>>,
    fingerprint: Option<Arc<dyn FingerprintProbe>>,
    face: Option<Arc<dyn FaceHardwareProbe>>,
    strong: Option<Arc<dyn StrongBiometricQuery>>,
    redirect: Option<Arc<dyn EnrollmentRedirect>>,
}

impl BridgeBuilder {
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            store: None,
            authenticator: None,
            fingerprint: None,
            face: None,
            strong: None,
            redirect: None,
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SecureKeyStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn BiometricAuthenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn with_fingerprint_probe(mut self, probe: Arc<dyn FingerprintProbe>) -> Self {
        self.fingerprint = Some(probe);
        self
    }

    pub fn with_face_probe(mut self, probe: Arc<dyn FaceHardwareProbe>) -> Self {
        self.face = Some(probe);
        self
    }

    pub fn with_strong_query(mut self, query: Arc<dyn StrongBiometricQuery>) -> Self {
        self.strong = Some(query);
        self
    }

    pub fn with_enrollment_redirect(mut self, redirect: Arc<dyn EnrollmentRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn build(self) -> BiometricChannel {
        let store = self.store.unwrap_or_else(|| Arc::new(SoftwareKeyStore::new()));
        let authenticator = self
            .authenticator
            .unwrap_or_else(|| Arc::new(ScriptedAuthenticator::succeeding()));
        let fingerprint = self
            .fingerprint
            .unwrap_or_else(|| Arc::new(MockFingerprintProbe::absent()));
        let face = self.face.unwrap_or_else(|| Arc::new(MockFaceProbe::unsupported()));
        let strong = self
            .strong
            .unwrap_or_else(|| Arc::new(MockStrongQuery::new(CanAuthenticate::NoHardware)));
        let redirect = self.redirect.unwrap_or_else(|| Arc::new(StaticRedirect(false)));

        // generate/delete and in-flight signing serialize on this lock
        let alias_lock = Arc::new(Mutex::new(()));

        let keys = KeyLifecycleManager::new(
            Arc::clone(&store),
            self.config.key_alias.clone(),
            self.config.key_policy.clone(),
            Arc::clone(&alias_lock),
        );
        let signing = SigningProtocol::new(
            store,
            authenticator,
            self.config.key_alias.clone(),
            self.config.prompt.clone(),
            alias_lock,
        );
        let capabilities = CapabilityService::new(fingerprint, face, strong);

        BiometricChannel { config: self.config, keys, signing, capabilities, redirect }
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_method_is_not_implemented() {
        let channel = BiometricChannel::builder().build();
        let err = channel.handle("definitelyNotAMethod", &Value::Null).await.unwrap_err();
        assert_eq!(err.kind(), "not_implemented");
    }

    #[tokio::test]
    async fn get_before_generate_is_null() {
        let channel = BiometricChannel::builder().build();
        let reply = channel.handle(methods::GET_PUBLIC_KEY_PEM, &Value::Null).await.unwrap();
        assert_eq!(reply, Value::Null);
    }

    #[tokio::test]
    async fn missing_challenge_is_invalid_args() {
        let channel = BiometricChannel::builder().build();

        for args in [Value::Null, json!({}), json!({"challenge": ""}), json!({"challenge": "   "})] {
            let err = channel.handle(methods::SIGN_CHALLENGE, &args).await.unwrap_err();
            assert_eq!(err.kind(), "invalid_args");
            assert_eq!(err.to_string(), "invalid arguments: challenge missing");
        }
    }

    #[tokio::test]
    async fn malformed_base64_challenge_is_invalid_args() {
        let channel = BiometricChannel::builder().build();
        let err = channel
            .handle(methods::SIGN_CHALLENGE, &json!({"challenge": "@@not-base64@@"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_args");
        assert_eq!(err.to_string(), "invalid arguments: challenge base64 invalid");
    }

    #[tokio::test]
    async fn delete_never_fails() {
        let channel = BiometricChannel::builder().build();
        let reply = channel.handle(methods::DELETE_LOCAL_KEY, &Value::Null).await.unwrap();
        assert_eq!(reply, Value::Bool(true));
    }

    #[tokio::test]
    async fn wire_failure_carries_kind_and_message() {
        let channel = BiometricChannel::builder().build();
        let failure = channel
            .handle_call(methods::SIGN_CHALLENGE, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, "invalid_args");
        assert!(failure.message.contains("challenge missing"));
    }

    #[tokio::test]
    async fn enrollment_redirect_reports_fallback() {
        let channel = BiometricChannel::builder().build();
        let reply = channel.handle(methods::OPEN_BIOMETRIC_ENROLL, &Value::Null).await.unwrap();
        assert_eq!(reply, Value::Bool(false));

        let channel = BiometricChannel::builder()
            .with_enrollment_redirect(Arc::new(StaticRedirect(true)))
            .build();
        let reply = channel.handle(methods::OPEN_BIOMETRIC_ENROLL, &Value::Null).await.unwrap();
        assert_eq!(reply, Value::Bool(true));
    }
}
