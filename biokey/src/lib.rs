//! Biometric-gated key bridge
//!
//! Core logic behind a device's biometric signing surface: the lifecycle of
//! one hardware-backed signing key, the challenge-sign protocol gated on an
//! operation-scoped authentication ceremony, the capability queries, and
//! the channel dispatcher the application shell calls into.
//!
//! The OS bindings live behind the trait seams of `biokey-store` and
//! `biokey-platform`; this crate only depends on their contracts.

pub mod capability;
pub mod channel;
pub mod config;
pub mod error;
pub mod keys;
pub mod signing;

pub use capability::{CapabilityService, FaceStatus};
pub use channel::{methods, BiometricChannel, BridgeBuilder, ChannelFailure};
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use keys::KeyLifecycleManager;
pub use signing::{SigningProtocol, SigningTicket};

// Re-export the layer contracts callers wire implementations into.
pub use biokey_platform::{
    BiometricAuthenticator, CanAuthenticate, CeremonyError, CeremonyEvent, EnrollmentRedirect,
    FaceHardwareProbe, FingerprintProbe, PromptSpec, StrongBiometricQuery,
};
pub use biokey_store::{KeyPolicy, SecureKeyStore, SoftwareKeyStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
