//! Platform types and data structures

use biokey_store::AuthorizationToken;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text shown by the authentication prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSpec {
    pub title: String,
    pub subtitle: String,
    pub negative_button: String,
}

impl Default for PromptSpec {
    fn default() -> Self {
        Self {
            title: "Authenticate to sign".to_string(),
            subtitle: "Confirm your biometrics".to_string(),
            negative_button: "Cancel".to_string(),
        }
    }
}

/// Parameters for one authentication ceremony.
///
/// The ceremony is scoped to a single pending sign operation; a success
/// event carries a token usable only by that operation.
#[derive(Debug, Clone)]
pub struct CeremonyRequest {
    pub operation_id: Uuid,
    pub prompt: PromptSpec,
}

/// Events delivered by an in-flight authentication ceremony.
#[derive(Debug, Clone)]
pub enum CeremonyEvent {
    /// One recognition attempt failed (wrong finger/face). Non-terminal; the
    /// OS prompt stays up and the user may retry.
    AttemptFailed,

    /// The user authenticated; the token authorizes exactly the operation
    /// the ceremony was started for.
    Succeeded(AuthorizationToken),

    /// Terminal ceremony error: cancel, lockout, timeout.
    Error(CeremonyError),

    /// The OS reported that the key backing this operation was permanently
    /// invalidated by an enrollment change.
    KeyInvalidated,
}

/// Terminal authentication ceremony errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CeremonyError {
    /// The user dismissed the prompt or pressed the negative button.
    Canceled,

    /// Too many failed attempts; the biometric sensor is locked out.
    Lockout,

    /// The ceremony timed out at the OS level.
    Timeout,

    /// Any other OS-reported error, with its message.
    Other(String),
}

impl std::fmt::Display for CeremonyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canceled => write!(f, "authentication canceled"),
            Self::Lockout => write!(f, "biometric lockout"),
            Self::Timeout => write!(f, "authentication timed out"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Result of the generic strong-class capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanAuthenticate {
    Success,
    NoneEnrolled,
    NoHardware,
    HwUnavailable,
}

impl CanAuthenticate {
    /// Raw status code, mirroring the OS constants reported in diagnostics.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::HwUnavailable => 1,
            Self::NoneEnrolled => 11,
            Self::NoHardware => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "BIOMETRIC_SUCCESS",
            Self::NoneEnrolled => "BIOMETRIC_ERROR_NONE_ENROLLED",
            Self::NoHardware => "BIOMETRIC_ERROR_NO_HARDWARE",
            Self::HwUnavailable => "BIOMETRIC_ERROR_HW_UNAVAILABLE",
        }
    }
}

/// Raw reading from the vendor-specific face hardware probe.
///
/// The probe is advisory and frequently misreports presence; consumers must
/// treat anything short of `hardware_detected && has_enrolled` as
/// inconclusive and fall back to the generic capability query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FaceProbeReading {
    /// The vendor face manager exists on this device.
    pub manager_present: bool,

    /// The probe reports face hardware present.
    pub hardware_detected: bool,

    /// The probe reports at least one enrolled face template.
    pub has_enrolled: bool,
}

impl FaceProbeReading {
    /// A reading from a device without the vendor face manager.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// The probe alone confirms face authentication is usable.
    pub fn confirms_available(&self) -> bool {
        self.hardware_detected && self.has_enrolled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_matches_product_copy() {
        let prompt = PromptSpec::default();
        assert_eq!(prompt.title, "Authenticate to sign");
        assert_eq!(prompt.negative_button, "Cancel");
    }

    #[test]
    fn unsupported_probe_never_confirms() {
        assert!(!FaceProbeReading::unsupported().confirms_available());
    }

    #[test]
    fn probe_requires_both_flags() {
        let hw_only = FaceProbeReading { manager_present: true, hardware_detected: true, has_enrolled: false };
        assert!(!hw_only.confirms_available());

        let both = FaceProbeReading { manager_present: true, hardware_detected: true, has_enrolled: true };
        assert!(both.confirms_available());
    }
}
