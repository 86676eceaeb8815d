//! OpenAI chat-completions client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::token_budget::{FeeModel, TokenCounter};
use super::{AiClient, AiClientMetadata};
use crate::ai::error::AiError;
use crate::config::ProviderKind;

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat-completions path appended to the base URL.
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Largest prompt accepted, in tokens.
pub const MAX_PROMPT_TOKENS: usize = 128_000;

/// Price per 1,000 prompt tokens.
const FEE_PER_1K_TOKENS: f64 = 0.02;

/// Approximate flat price of one completion.
const FEE_COMPLETION: f64 = 0.001;

/// OpenAI API request message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// OpenAI API request body.
#[derive(Serialize, Debug)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

/// Chat-completions response choice.
#[derive(Deserialize, Debug)]
pub(crate) struct Choice {
    pub(crate) message: ResponseMessage,
}

/// Chat-completions response message.
#[derive(Deserialize, Debug)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

/// Chat-completions response, shared with OpenAI-compatible gateways.
#[derive(Deserialize, Debug)]
pub(crate) struct ChatCompletionResponse {
    pub(crate) choices: Vec<Choice>,
    pub(crate) model: Option<String>,
    pub(crate) usage: Option<Usage>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug)]
#[allow(dead_code)]
pub(crate) struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    /// Returns the text of the first choice.
    pub(crate) fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::InvalidResponseFormat("No choices in response".to_string()).into())
    }
}

/// OpenAI API client.
pub struct OpenAiAiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Base URL for the API.
    base_url: String,
    /// Token ceiling override.
    max_prompt_tokens: Option<usize>,
}

impl OpenAiAiClient {
    /// Default model when none is configured.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Creates a new OpenAI API client.
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        max_prompt_tokens: Option<usize>,
    ) -> Result<Self> {
        Ok(Self {
            client: super::build_http_client()?,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_prompt_tokens,
        })
    }

    /// Builds the full API URL.
    fn get_api_url(&self) -> String {
        let url = super::join_url(&self.base_url, COMPLETIONS_PATH);
        debug!(base_url = %self.base_url, full_url = %url, "Constructed OpenAI API URL");
        url
    }
}

impl AiClient for OpenAiAiClient {
    fn send_request<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                prompt_len = prompt.len(),
                model = %self.model,
                "Preparing OpenAI API request"
            );

            let request = OpenAiRequest {
                model: self.model.clone(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                }],
                stream: false,
            };

            let api_url = self.get_api_url();
            info!(url = %api_url, model = %self.model, "Sending request to OpenAI API");

            let response = self
                .client
                .post(&api_url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await
                .map_err(|e| AiError::NetworkError(e.to_string()))?;

            let response = super::check_error_response(response).await?;

            let completion: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = completion.choices.len(),
                model = ?completion.model,
                usage = ?completion.usage,
                "Received OpenAI API response"
            );

            let result = completion.into_text();
            super::log_response_success("OpenAI", &result);
            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: ProviderKind::OpenAi,
            model: self.model.clone(),
            max_prompt_tokens: self.max_prompt_tokens.unwrap_or(MAX_PROMPT_TOKENS),
            fee: Some(FeeModel {
                per_1k_tokens: FEE_PER_1K_TOKENS,
                per_completion: FEE_COMPLETION,
            }),
            token_counter: TokenCounter::Tiktoken,
        }
    }
}
