//! Device biometric capability queries
//!
//! Read-only classification of the device's biometric state. Every query is
//! recomputed from live probes; nothing is cached. Probe failures map to the
//! conservative answer (capability absent) instead of propagating.

use std::sync::Arc;

use biokey_platform::{
    CanAuthenticate, FaceHardwareProbe, FingerprintProbe, StrongBiometricQuery,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Three-way face capability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceStatus {
    Available,
    NotEnrolled,
    NotAvailable,
}

impl FaceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotEnrolled => "not_enrolled",
            Self::NotAvailable => "not_available",
        }
    }
}

pub struct CapabilityService {
    fingerprint: Arc<dyn FingerprintProbe>,
    face: Arc<dyn FaceHardwareProbe>,
    strong: Arc<dyn StrongBiometricQuery>,
}

impl CapabilityService {
    pub fn new(
        fingerprint: Arc<dyn FingerprintProbe>,
        face: Arc<dyn FaceHardwareProbe>,
        strong: Arc<dyn StrongBiometricQuery>,
    ) -> Self {
        Self { fingerprint, face, strong }
    }

    /// True iff fingerprint hardware is present and at least one template is
    /// enrolled.
    pub fn fingerprint_enrolled(&self) -> bool {
        let hardware = self.fingerprint.hardware_detected().unwrap_or_else(|e| {
            warn!(error = %e, "fingerprint hardware probe failed, treating as absent");
            false
        });
        if !hardware {
            return false;
        }
        self.fingerprint.has_enrolled_fingerprints().unwrap_or_else(|e| {
            warn!(error = %e, "fingerprint enrollment probe failed, treating as none");
            false
        })
    }

    /// Two-tier face classification.
    ///
    /// The vendor probe can confirm availability on its own, but it is
    /// advisory only: anything short of a full confirmation falls through to
    /// the generic strong-class query, so the probe never downgrades a
    /// status the generic query would report more favorably.
    pub fn face_status(&self) -> FaceStatus {
        let reading = self.face.read();
        if reading.confirms_available() {
            debug!("vendor face probe confirms availability");
            return FaceStatus::Available;
        }

        match self.strong_answer() {
            CanAuthenticate::Success => FaceStatus::Available,
            CanAuthenticate::NoneEnrolled => FaceStatus::NotEnrolled,
            CanAuthenticate::NoHardware | CanAuthenticate::HwUnavailable => {
                FaceStatus::NotAvailable
            }
        }
    }

    /// Raw sub-check readings for debugging. Truthful reporting only; no
    /// behavioral contract beyond that.
    pub fn diagnostics(&self) -> serde_json::Value {
        let reading = self.face.read();
        let can = self.strong_answer();
        let face_feature = self.strong.face_feature_declared().unwrap_or_else(|e| {
            warn!(error = %e, "face feature query failed");
            false
        });

        let diag = json!({
            "faceManagerPresent": reading.manager_present,
            "faceManagerIsDetected": reading.hardware_detected,
            "faceManagerHasEnrolled": reading.has_enrolled,
            "packageHasFaceFeature": face_feature,
            "biometricCanAuthenticate": can.code(),
            "biometricCanAuthenticateStr": can.as_str(),
        });
        debug!(%diag, "capability diagnostics");
        diag
    }

    fn strong_answer(&self) -> CanAuthenticate {
        self.strong.can_authenticate().unwrap_or_else(|e| {
            warn!(error = %e, "strong biometric query failed, treating as no hardware");
            CanAuthenticate::NoHardware
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biokey_platform::mock::{
        FailingFingerprintProbe, FailingStrongQuery, MockFaceProbe, MockFingerprintProbe,
        MockStrongQuery,
    };

    fn service(
        fingerprint: impl FingerprintProbe + 'static,
        face: MockFaceProbe,
        strong: impl StrongBiometricQuery + 'static,
    ) -> CapabilityService {
        CapabilityService::new(Arc::new(fingerprint), Arc::new(face), Arc::new(strong))
    }

    #[test]
    fn fingerprint_requires_hardware_and_enrollment() {
        let svc = service(
            MockFingerprintProbe::enrolled(),
            MockFaceProbe::unsupported(),
            MockStrongQuery::new(CanAuthenticate::Success),
        );
        assert!(svc.fingerprint_enrolled());

        let svc = service(
            MockFingerprintProbe::hardware_only(),
            MockFaceProbe::unsupported(),
            MockStrongQuery::new(CanAuthenticate::Success),
        );
        assert!(!svc.fingerprint_enrolled());

        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::unsupported(),
            MockStrongQuery::new(CanAuthenticate::Success),
        );
        assert!(!svc.fingerprint_enrolled());
    }

    #[test]
    fn fingerprint_probe_failure_fails_open() {
        let svc = service(
            FailingFingerprintProbe,
            MockFaceProbe::unsupported(),
            MockStrongQuery::new(CanAuthenticate::Success),
        );
        assert!(!svc.fingerprint_enrolled());
    }

    #[test]
    fn vendor_probe_confirmation_wins_over_generic_query() {
        // generic query says no hardware, but the probe fully confirms
        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::detected_and_enrolled(),
            MockStrongQuery::new(CanAuthenticate::NoHardware),
        );
        assert_eq!(svc.face_status(), FaceStatus::Available);
    }

    #[test]
    fn inconclusive_probe_falls_back_to_generic_query() {
        let cases = [
            (CanAuthenticate::Success, FaceStatus::Available),
            (CanAuthenticate::NoneEnrolled, FaceStatus::NotEnrolled),
            (CanAuthenticate::NoHardware, FaceStatus::NotAvailable),
            (CanAuthenticate::HwUnavailable, FaceStatus::NotAvailable),
        ];
        for (answer, expected) in cases {
            let svc = service(
                MockFingerprintProbe::absent(),
                MockFaceProbe::unsupported(),
                MockStrongQuery::new(answer),
            );
            assert_eq!(svc.face_status(), expected);
        }
    }

    #[test]
    fn probe_never_downgrades_generic_answer() {
        // probe sees hardware but no enrollment; generic query still says
        // authentication works, so the status stays available
        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::detected_not_enrolled(),
            MockStrongQuery::new(CanAuthenticate::Success),
        );
        assert_eq!(svc.face_status(), FaceStatus::Available);
    }

    #[test]
    fn strong_query_failure_fails_open_to_not_available() {
        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::unsupported(),
            FailingStrongQuery,
        );
        assert_eq!(svc.face_status(), FaceStatus::NotAvailable);
    }

    #[test]
    fn diagnostics_report_raw_readings() {
        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::detected_not_enrolled(),
            MockStrongQuery { answer: CanAuthenticate::NoneEnrolled, face_feature: true },
        );

        let diag = svc.diagnostics();
        assert_eq!(diag["faceManagerPresent"], true);
        assert_eq!(diag["faceManagerIsDetected"], true);
        assert_eq!(diag["faceManagerHasEnrolled"], false);
        assert_eq!(diag["packageHasFaceFeature"], true);
        assert_eq!(diag["biometricCanAuthenticate"], 11);
        assert_eq!(diag["biometricCanAuthenticateStr"], "BIOMETRIC_ERROR_NONE_ENROLLED");
    }

    #[test]
    fn diagnostics_survive_failing_query() {
        let svc = service(
            MockFingerprintProbe::absent(),
            MockFaceProbe::unsupported(),
            FailingStrongQuery,
        );
        let diag = svc.diagnostics();
        assert_eq!(diag["biometricCanAuthenticateStr"], "BIOMETRIC_ERROR_NO_HARDWARE");
    }
}
