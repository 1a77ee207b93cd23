//! Core platform trait definitions

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    error::PlatformResult,
    types::{CanAuthenticate, CeremonyEvent, CeremonyRequest, FaceProbeReading},
};

/// The operation-scoped biometric authentication ceremony.
///
/// `begin_ceremony` shows the OS prompt and returns immediately; progress
/// arrives as [`CeremonyEvent`]s on the returned channel. The ceremony is
/// parameterized by the pending sign operation's id, so a success event can
/// only authorize that operation. There is no "user is authenticated" flag
/// to cache or reuse.
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    async fn begin_ceremony(
        &self,
        request: CeremonyRequest,
    ) -> PlatformResult<mpsc::Receiver<CeremonyEvent>>;
}

/// Fingerprint hardware and enrollment probe.
pub trait FingerprintProbe: Send + Sync {
    fn hardware_detected(&self) -> PlatformResult<bool>;
    fn has_enrolled_fingerprints(&self) -> PlatformResult<bool>;
}

/// Vendor-specific face hardware probe with graceful absence.
///
/// Implementations must return an inconclusive reading rather than raise
/// when the vendor API is missing on this device.
pub trait FaceHardwareProbe: Send + Sync {
    fn read(&self) -> FaceProbeReading;
}

/// Generic biometric capability query, restricted to the strong-assurance
/// class.
pub trait StrongBiometricQuery: Send + Sync {
    fn can_authenticate(&self) -> PlatformResult<CanAuthenticate>;

    /// Whether the device declares a face feature in its package metadata.
    /// Diagnostic only; never changes the capability classification.
    fn face_feature_declared(&self) -> PlatformResult<bool> {
        Ok(false)
    }
}

/// Opens the biometric enrollment UI.
pub trait EnrollmentRedirect: Send + Sync {
    /// Returns `true` when the direct strong-biometric enrollment UI was
    /// opened, `false` when only a fallback settings page (or nothing)
    /// could be opened. Never hard-fails.
    fn open_enroll(&self) -> bool;
}
