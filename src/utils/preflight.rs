//! Preflight validation checks for early failure detection
//!
//! Runs before the diff is read so a missing API key fails fast, without
//! touching the repository or the network.

use anyhow::Result;

use crate::ai::AiError;
use crate::config::{Config, ProviderKind};

/// Result of AI credential validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiCredentialInfo {
    /// The AI provider that will be used
    pub provider: ProviderKind,
    /// The model that will be used
    pub model: String,
}

/// Validate AI credentials are available before processing
///
/// Providers that need a key fail with [`AiError::ApiKeyNotFound`],
/// listing the environment variables that were consulted.
pub fn check_ai_credentials(config: &Config) -> Result<AiCredentialInfo> {
    if config.provider.requires_api_key() && config.api_key.is_none() {
        return Err(AiError::ApiKeyNotFound {
            provider: config.provider.to_string(),
            env_vars: config.provider.api_key_env_vars().join(", "),
        }
        .into());
    }

    Ok(AiCredentialInfo {
        provider: config.provider,
        model: config.model_name().to_string(),
    })
}
