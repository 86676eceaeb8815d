//! Token estimation, budget validation and fee estimates for AI requests.
//!
//! Prompts are validated against a provider's token ceiling before any
//! request is sent. Providers that charge per token carry a [`FeeModel`]
//! so the caller can show the estimated cost and ask for confirmation.

use std::sync::OnceLock;

use anyhow::Result;
use tiktoken_rs::CoreBPE;

use crate::ai::error::AiError;
use crate::ai::AiClientMetadata;

/// Approximate characters per token for heuristic estimation.
const CHARS_PER_TOKEN: f64 = 3.5;

/// Safety margin multiplier applied to heuristic token estimates.
const SAFETY_MARGIN: f64 = 1.10;

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();

/// Estimates the token count for a text string using a character-based heuristic.
///
/// Uses the approximation of 1 token per 3.5 characters with a 10% safety
/// margin. Overestimates rather than underestimates.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    let raw_estimate = text.len() as f64 / CHARS_PER_TOKEN;
    (raw_estimate * SAFETY_MARGIN).ceil() as usize
}

/// How a provider's prompt tokens are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCounter {
    /// Exact BPE count with the `cl100k_base` encoding.
    Tiktoken,
    /// Character-based estimate from [`estimate_tokens`].
    Heuristic,
}

impl TokenCounter {
    /// Counts the tokens in `text`.
    ///
    /// Falls back to the heuristic if the BPE tables cannot be loaded.
    pub fn count(self, text: &str) -> usize {
        match self {
            Self::Tiktoken => match CL100K.get_or_init(|| tiktoken_rs::cl100k_base().ok()) {
                Some(bpe) => bpe.encode_with_special_tokens(text).len(),
                None => {
                    tracing::debug!("cl100k_base unavailable, using heuristic token estimate");
                    estimate_tokens(text)
                }
            },
            Self::Heuristic => estimate_tokens(text),
        }
    }
}

/// Per-request pricing of a provider, in US dollars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeModel {
    /// Price per 1,000 prompt tokens.
    pub per_1k_tokens: f64,
    /// Flat price per requested completion.
    pub per_completion: f64,
}

impl FeeModel {
    /// Returns `tokens / 1000 * per_1k_tokens + completions * per_completion`.
    #[must_use]
    pub fn estimate(&self, tokens: usize, completions: usize) -> f64 {
        (tokens as f64 / 1000.0) * self.per_1k_tokens + self.per_completion * completions as f64
    }
}

/// Result of a token budget validation.
#[derive(Debug, Clone)]
pub struct TokenEstimate {
    /// Estimated prompt tokens.
    pub estimated_tokens: usize,
    /// Utilization percentage (0.0 to 100.0).
    pub utilization_pct: f64,
}

/// Token budget derived from provider metadata.
#[derive(Debug, Clone)]
pub struct TokenBudget {
    /// Model identifier (for error messages).
    model: String,
    /// Largest prompt the provider accepts.
    max_prompt_tokens: usize,
    counter: TokenCounter,
}

impl TokenBudget {
    /// Creates a token budget from AI client metadata.
    #[must_use]
    pub fn from_metadata(metadata: &AiClientMetadata) -> Self {
        Self {
            model: metadata.model.clone(),
            max_prompt_tokens: metadata.max_prompt_tokens,
            counter: metadata.token_counter,
        }
    }

    /// Counts the tokens in `prompt` with this provider's counter.
    pub fn count(&self, prompt: &str) -> usize {
        self.counter.count(prompt)
    }

    /// Validates that the prompt fits within the provider's ceiling.
    ///
    /// Returns a [`TokenEstimate`] on success, or an
    /// [`AiError::PromptTooLarge`] error when the prompt must not be sent.
    pub fn validate_prompt(&self, prompt: &str) -> Result<TokenEstimate> {
        let estimated_tokens = self.count(prompt);
        let available = self.max_prompt_tokens;

        if estimated_tokens > available {
            return Err(AiError::PromptTooLarge {
                estimated_tokens,
                max_tokens: available,
                model: self.model.clone(),
            }
            .into());
        }

        let utilization_pct = if available > 0 {
            (estimated_tokens as f64 / available as f64) * 100.0
        } else {
            0.0
        };

        Ok(TokenEstimate {
            estimated_tokens,
            utilization_pct,
        })
    }
}
