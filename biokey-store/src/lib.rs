//! Secure key store abstraction for the biokey bridge
//!
//! This crate provides the lowest layer of the bridge: a named signing key
//! inside a secure store, the pending-signature operation that binds an
//! authentication ceremony to one specific private-key use, and the PEM/DER
//! encoding of the exportable public key.

pub mod error;
pub mod pem;
pub mod software;
pub mod traits;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use software::SoftwareKeyStore;
pub use traits::{SecureKeyStore, SignOperation};
pub use types::{AuthorizationToken, KeyPolicy, Signature};
