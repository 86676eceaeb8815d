//! Ollama native chat client for locally hosted models.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::token_budget::TokenCounter;
use super::{AiClient, AiClientMetadata};
use crate::ai::error::AiError;
use crate::config::ProviderKind;

/// Default local Ollama address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

const CHAT_PATH: &str = "/api/chat";

#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done_reason: Option<String>,
}

/// Client for the Ollama `/api/chat` endpoint.
///
/// Local models are free and have no practical prompt limit, so the
/// metadata reports no fee and an unlimited ceiling unless overridden.
pub struct OllamaAiClient {
    client: Client,
    model: String,
    base_url: String,
    max_prompt_tokens: Option<usize>,
}

impl OllamaAiClient {
    /// Default model when none is configured.
    pub const DEFAULT_MODEL: &'static str = "mistral";

    /// Creates a new Ollama client.
    pub fn new(
        model: String,
        base_url: Option<String>,
        max_prompt_tokens: Option<usize>,
    ) -> Result<Self> {
        Ok(Self {
            client: super::build_http_client()?,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_prompt_tokens,
        })
    }
}

impl AiClient for OllamaAiClient {
    fn send_request<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = OllamaChatRequest {
                model: self.model.clone(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                }],
                stream: false,
            };

            let api_url = super::join_url(&self.base_url, CHAT_PATH);
            info!(url = %api_url, model = %self.model, "Prompting Ollama");

            let response = self
                .client
                .post(&api_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    AiError::NetworkError(format!("Local model unreachable at {api_url}: {e}"))
                })?;

            let response = super::check_error_response(response).await?;

            let chat: OllamaChatResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

            debug!(done_reason = ?chat.done_reason, "Received Ollama response");

            let result: Result<String> = chat.message.map(|m| m.content).ok_or_else(|| {
                AiError::InvalidResponseFormat("No message in Ollama response".to_string()).into()
            });
            super::log_response_success("Ollama", &result);
            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: ProviderKind::Ollama,
            model: self.model.clone(),
            max_prompt_tokens: self.max_prompt_tokens.unwrap_or(usize::MAX),
            fee: None,
            token_counter: TokenCounter::Heuristic,
        }
    }
}
