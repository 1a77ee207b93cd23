//! Bridge configuration

use biokey_platform::PromptSpec;
use biokey_store::KeyPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for one bridge instance.
///
/// The alias and channel name are configuration-scoped so that multiple key
/// profiles can coexist; the defaults reproduce the single-profile setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logical channel name the application shell dispatches on.
    pub channel_name: String,

    /// Secure-store alias of the signing key.
    pub key_alias: String,

    /// Policy applied to every generated key.
    pub key_policy: KeyPolicy,

    /// Prompt copy for the authentication ceremony.
    pub prompt: PromptSpec,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_name: "biokey/biometric".to_string(),
            key_alias: "biometric_key_default".to_string(),
            key_policy: KeyPolicy::default(),
            prompt: PromptSpec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_auth_gated() {
        let config = BridgeConfig::default();
        assert_eq!(config.key_alias, "biometric_key_default");
        assert!(config.key_policy.require_user_auth);
        assert!(config.key_policy.invalidated_by_enrollment_change);
    }
}
