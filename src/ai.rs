//! Language-model providers, prompts and request budgeting.

pub mod error;
pub mod ollama;
pub mod openai;
pub mod openrouter;
pub mod prompts;
pub mod summarize;
pub mod token_budget;

#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::ai::ollama::OllamaAiClient;
use crate::ai::openai::OpenAiAiClient;
use crate::ai::openrouter::OpenRouterAiClient;
use crate::ai::token_budget::{FeeModel, TokenCounter};
use crate::config::{Config, ProviderKind};

pub use error::AiError;
pub use token_budget::{TokenBudget, TokenEstimate};

/// HTTP request timeout for AI API calls.
///
/// Bounds every request so a stalled endpoint cannot block the process
/// forever. Local models can be slow on large diffs, hence 5 minutes.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Metadata about an AI client implementation.
#[derive(Clone, Debug)]
pub struct AiClientMetadata {
    /// Provider variant.
    pub provider: ProviderKind,
    /// Model identifier.
    pub model: String,
    /// Largest prompt, in tokens, the provider accepts.
    pub max_prompt_tokens: usize,
    /// Pricing, if the provider charges for requests.
    pub fee: Option<FeeModel>,
    /// How prompt tokens are counted.
    pub token_counter: TokenCounter,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a prompt to the AI service and returns the generated text.
    fn send_request<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}

/// Creates the client for the configured provider.
///
/// Fails with [`AiError::ApiKeyNotFound`] when the provider needs a key
/// and none was resolved.
pub fn create_client(config: &Config) -> Result<Box<dyn AiClient>> {
    let model = config.model_name().to_string();
    let base_url = config.endpoint.as_ref().map(ToString::to_string);

    info!(provider = %config.provider, model = %model, "Initializing AI client");

    let client: Box<dyn AiClient> = match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiAiClient::new(
            model,
            require_api_key(config)?,
            base_url,
            config.max_tokens,
        )?),
        ProviderKind::Ollama => Box::new(OllamaAiClient::new(model, base_url, config.max_tokens)?),
        ProviderKind::OpenRouter => Box::new(OpenRouterAiClient::new(
            model,
            require_api_key(config)?,
            base_url,
            config.max_tokens,
        )?),
    };

    Ok(client)
}

fn require_api_key(config: &Config) -> Result<String> {
    config.api_key.clone().ok_or_else(|| {
        AiError::ApiKeyNotFound {
            provider: config.provider.to_string(),
            env_vars: config.provider.api_key_env_vars().join(", "),
        }
        .into()
    })
}

// ── Shared helpers for AI client implementations ────────────────────

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Joins a base URL and an API path without doubling the slash.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Checks an HTTP response for error status and returns a structured error
/// if non-success.
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(AiError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into())
}

/// Logs successful text extraction from an AI API response.
pub(crate) fn log_response_success(provider: &str, result: &Result<String>) {
    if let Ok(text) = result {
        tracing::debug!(
            response_len = text.len(),
            "Successfully extracted text content from {} API response",
            provider
        );
        tracing::debug!(response_content = %text, "{} API response content", provider);
    }
}
