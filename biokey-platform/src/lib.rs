//! Platform adapters for the biokey bridge
//!
//! This crate provides the platform layer between the core bridge logic and
//! the operating system's biometric subsystem: the operation-scoped
//! authentication ceremony, the capability probes (fingerprint, vendor face
//! hardware, generic strong-class query), and the enrollment redirect.
//! Scripted implementations for tests and software fallback live in
//! [`mock`].

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{PlatformError, PlatformResult};
pub use traits::{
    BiometricAuthenticator, EnrollmentRedirect, FaceHardwareProbe, FingerprintProbe,
    StrongBiometricQuery,
};
pub use types::{
    CanAuthenticate, CeremonyError, CeremonyEvent, CeremonyRequest, FaceProbeReading, PromptSpec,
};

pub fn platform_name() -> &'static str {
    #[cfg(target_os = "android")]
    return "Android";

    #[cfg(target_os = "ios")]
    return "iOS";

    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    return "Host";
}
