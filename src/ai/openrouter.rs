//! OpenRouter client, used for Gemini and other hosted models.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::openai::ChatCompletionResponse;
use super::token_budget::{FeeModel, TokenCounter};
use super::{AiClient, AiClientMetadata};
use crate::ai::error::AiError;
use crate::config::ProviderKind;

/// Default OpenRouter API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api";

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Largest prompt accepted, in tokens.
pub const MAX_PROMPT_TOKENS: usize = 1_000_000;

const FEE_PER_1K_TOKENS: f64 = 0.0;
const FEE_COMPLETION: f64 = 0.001;

/// A typed content part; OpenRouter accepts multi-part user messages.
#[derive(Serialize, Debug)]
struct ContentPart {
    #[serde(rename = "type")]
    part_type: &'static str,
    text: String,
}

#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize, Debug)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

/// OpenRouter chat-completions client.
pub struct OpenRouterAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_prompt_tokens: Option<usize>,
}

impl OpenRouterAiClient {
    /// Default model when none is configured.
    pub const DEFAULT_MODEL: &'static str = "google/gemini-2.0-flash-lite-preview-02-05:free";

    /// Creates a new OpenRouter client.
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
}

impl AiClient for OpenRouterAiClient {
    fn send_request<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = OpenRouterRequest {
                model: self.model.clone(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: vec![ContentPart {
                        part_type: "text",
                        text: prompt.to_string(),
                    }],
                }],
                stream: false,
            };

            let api_url = super::join_url(&self.base_url, COMPLETIONS_PATH);
            info!(url = %api_url, model = %self.model, "Sending request to OpenRouter API");

            let response = self
                .client
                .post(&api_url)
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
                "Received OpenRouter API response"
            );

            let result = completion.into_text();
            super::log_response_success("OpenRouter", &result);
            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: ProviderKind::OpenRouter,
            model: self.model.clone(),
            max_prompt_tokens: self.max_prompt_tokens.unwrap_or(MAX_PROMPT_TOKENS),
            fee: Some(FeeModel {
                per_1k_tokens: FEE_PER_1K_TOKENS,
                per_completion: FEE_COMPLETION,
            }),
            token_counter: TokenCounter::Heuristic,
        }
    }
}
