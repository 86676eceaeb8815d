//! Provider and token-budget errors.

use thiserror::Error;

/// Errors raised while preparing or sending a language-model request.
#[derive(Error, Debug)]
pub enum AiError {
    /// API key not found for a provider that requires one.
    #[error("{provider} API key not found. Pass --api-key or set one of: {env_vars}")]
    ApiKeyNotFound {
        /// Display name of the provider.
        provider: String,
        /// Comma-separated environment variables that were consulted.
        env_vars: String,
    },

    /// API request failed with error message.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from the provider.
    #[error("Invalid response format from API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Prompt exceeds the model's token ceiling.
    #[error(
        "Prompt too large for {model}: estimated {estimated_tokens} tokens exceeds the limit of {max_tokens}"
    )]
    PromptTooLarge {
        /// Estimated prompt tokens.
        estimated_tokens: usize,
        /// Token ceiling of the provider.
        max_tokens: usize,
        /// Model identifier.
        model: String,
    },

    /// None of the changed files could be summarized within the budget.
    #[error("Nothing to summarize: all {skipped} changed file(s) exceed the token limit")]
    NothingToSummarize {
        /// Number of files that were skipped.
        skipped: usize,
    },

    /// Every summary request came back blank.
    #[error("Nothing to summarize: the model returned an empty summary for all {files} file(s)")]
    EmptySummaries {
        /// Number of files whose summary was empty.
        files: usize,
    },

    /// Invalid provider configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
