//! Scripted platform implementations for tests and software fallback

use async_trait::async_trait;
use biokey_store::AuthorizationToken;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{PlatformError, PlatformResult},
    traits::{
        BiometricAuthenticator, EnrollmentRedirect, FaceHardwareProbe, FingerprintProbe,
        StrongBiometricQuery,
    },
    types::{CanAuthenticate, CeremonyError, CeremonyEvent, CeremonyRequest, FaceProbeReading},
};

/// One step in a scripted ceremony.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Non-terminal recognition failure.
    AttemptFailed,

    /// Success with a token bound to the requested operation.
    Succeed,

    /// Success with a token bound to some unrelated operation. Exercises the
    /// broken-binding path.
    SucceedUnbound,

    /// Terminal ceremony error.
    Error(CeremonyError),

    /// The OS reports key invalidation during the ceremony.
    KeyInvalidated,
}

/// Authenticator that replays a fixed event script for every ceremony.
pub struct ScriptedAuthenticator {
    script: Vec<ScriptStep>,
    available: bool,
    hold_open: bool,
}

impl ScriptedAuthenticator {
    pub fn with_script(script: Vec<ScriptStep>) -> Self {
        Self { script, available: true, hold_open: false }
    }

    /// Every ceremony succeeds on the first attempt.
    pub fn succeeding() -> Self {
        Self::with_script(vec![ScriptStep::Succeed])
    }

    /// `attempts` failed recognitions, then success.
    pub fn succeeding_after(attempts: usize) -> Self {
        let mut script = vec![ScriptStep::AttemptFailed; attempts];
        script.push(ScriptStep::Succeed);
        Self::with_script(script)
    }

    pub fn erroring(error: CeremonyError) -> Self {
        Self::with_script(vec![ScriptStep::Error(error)])
    }

    pub fn invalidating() -> Self {
        Self::with_script(vec![ScriptStep::KeyInvalidated])
    }

    /// Succeeds, but the token does not authorize the requested operation.
    pub fn succeeding_unbound() -> Self {
        Self::with_script(vec![ScriptStep::SucceedUnbound])
    }

    /// The ceremony never reaches a terminal event; the prompt stays up.
    pub fn pending() -> Self {
        Self { script: vec![ScriptStep::AttemptFailed], available: true, hold_open: true }
    }

    /// `begin_ceremony` itself fails.
    pub fn unavailable() -> Self {
        Self { script: Vec::new(), available: false, hold_open: false }
    }
}

#[async_trait]
impl BiometricAuthenticator for ScriptedAuthenticator {
    async fn begin_ceremony(
        &self,
        request: CeremonyRequest,
    ) -> PlatformResult<mpsc::Receiver<CeremonyEvent>> {
        if !self.available {
            return Err(PlatformError::CeremonyUnavailable(
                "biometric prompt could not be shown".into(),
            ));
        }

        debug!(operation = %request.operation_id, title = %request.prompt.title, "scripted ceremony started");

        let (tx, rx) = mpsc::channel(8);
        let script = self.script.clone();
        let hold_open = self.hold_open;
        let operation_id = request.operation_id;
        tokio::spawn(async move {
            for step in script {
                let event = match step {
                    ScriptStep::AttemptFailed => CeremonyEvent::AttemptFailed,
                    ScriptStep::Succeed => {
                        CeremonyEvent::Succeeded(AuthorizationToken::for_operation(operation_id))
                    }
                    ScriptStep::SucceedUnbound => {
                        CeremonyEvent::Succeeded(AuthorizationToken::for_operation(Uuid::new_v4()))
                    }
                    ScriptStep::Error(e) => CeremonyEvent::Error(e),
                    ScriptStep::KeyInvalidated => CeremonyEvent::KeyInvalidated,
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if hold_open {
                // keep the sender alive so the ceremony never closes
                tx.closed().await;
            }
        });

        Ok(rx)
    }
}

/// Fingerprint probe with fixed readings.
pub struct MockFingerprintProbe {
    pub hardware: bool,
    pub enrolled: bool,
}

impl MockFingerprintProbe {
    pub fn enrolled() -> Self {
        Self { hardware: true, enrolled: true }
    }

    pub fn hardware_only() -> Self {
        Self { hardware: true, enrolled: false }
    }

    pub fn absent() -> Self {
        Self { hardware: false, enrolled: false }
    }
}

impl FingerprintProbe for MockFingerprintProbe {
    fn hardware_detected(&self) -> PlatformResult<bool> {
        Ok(self.hardware)
    }

    fn has_enrolled_fingerprints(&self) -> PlatformResult<bool> {
        Ok(self.enrolled)
    }
}

/// Fingerprint probe whose reads fail; exercises fail-open handling.
pub struct FailingFingerprintProbe;

impl FingerprintProbe for FailingFingerprintProbe {
    fn hardware_detected(&self) -> PlatformResult<bool> {
        Err(PlatformError::ProbeFailed("fingerprint service unreachable".into()))
    }

    fn has_enrolled_fingerprints(&self) -> PlatformResult<bool> {
        Err(PlatformError::ProbeFailed("fingerprint service unreachable".into()))
    }
}

/// Face hardware probe with a fixed reading.
pub struct MockFaceProbe(pub FaceProbeReading);

impl MockFaceProbe {
    /// Device without the vendor face manager.
    pub fn unsupported() -> Self {
        Self(FaceProbeReading::unsupported())
    }

    pub fn detected_and_enrolled() -> Self {
        Self(FaceProbeReading { manager_present: true, hardware_detected: true, has_enrolled: true })
    }

    pub fn detected_not_enrolled() -> Self {
        Self(FaceProbeReading { manager_present: true, hardware_detected: true, has_enrolled: false })
    }
}

impl FaceHardwareProbe for MockFaceProbe {
    fn read(&self) -> FaceProbeReading {
        self.0
    }
}

/// Strong-class capability query with a fixed answer.
pub struct MockStrongQuery {
    pub answer: CanAuthenticate,
    pub face_feature: bool,
}

impl MockStrongQuery {
    pub fn new(answer: CanAuthenticate) -> Self {
        Self { answer, face_feature: false }
    }
}

impl StrongBiometricQuery for MockStrongQuery {
    fn can_authenticate(&self) -> PlatformResult<CanAuthenticate> {
        Ok(self.answer)
    }

    fn face_feature_declared(&self) -> PlatformResult<bool> {
        Ok(self.face_feature)
    }
}

/// Strong-class query whose reads fail; exercises fail-open handling.
pub struct FailingStrongQuery;

impl StrongBiometricQuery for FailingStrongQuery {
    fn can_authenticate(&self) -> PlatformResult<CanAuthenticate> {
        Err(PlatformError::ProbeFailed("biometric manager unreachable".into()))
    }
}

/// Enrollment redirect with a fixed outcome.
pub struct StaticRedirect(pub bool);

impl EnrollmentRedirect for StaticRedirect {
    fn open_enroll(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_success_binds_to_requested_operation() {
        let auth = ScriptedAuthenticator::succeeding();
        let op_id = Uuid::new_v4();
        let request = CeremonyRequest { operation_id: op_id, prompt: Default::default() };

        let mut events = auth.begin_ceremony(request).await.unwrap();
        match events.recv().await {
            Some(CeremonyEvent::Succeeded(token)) => assert_eq!(token.operation_id(), op_id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn scripted_retries_precede_success() {
        let auth = ScriptedAuthenticator::succeeding_after(2);
        let request = CeremonyRequest { operation_id: Uuid::new_v4(), prompt: Default::default() };

        let mut events = auth.begin_ceremony(request).await.unwrap();
        assert!(matches!(events.recv().await, Some(CeremonyEvent::AttemptFailed)));
        assert!(matches!(events.recv().await, Some(CeremonyEvent::AttemptFailed)));
        assert!(matches!(events.recv().await, Some(CeremonyEvent::Succeeded(_))));
    }

    #[tokio::test]
    async fn unavailable_authenticator_fails_to_start() {
        let auth = ScriptedAuthenticator::unavailable();
        let request = CeremonyRequest { operation_id: Uuid::new_v4(), prompt: Default::default() };
        assert!(auth.begin_ceremony(request).await.is_err());
    }
}
