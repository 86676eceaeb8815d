//! Resolved runtime configuration.
//!
//! Every option is looked up in order: command-line flag, environment
//! variable, then the `env` map of the settings file. The result is an
//! immutable [`Config`] passed by reference to the rest of the program.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};
use url::Url;

use crate::ai::ollama::OllamaAiClient;
use crate::ai::openai::OpenAiAiClient;
use crate::ai::openrouter::OpenRouterAiClient;
use crate::ai::AiError;
use crate::cli::Cli;
use crate::utils::settings::Settings;

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Number of candidates generated in list mode when none is configured.
pub const DEFAULT_NUM_OPTIONS: usize = 5;

/// Fallback key variable consulted for every provider that needs a key.
const GENERIC_API_KEY_VAR: &str = "AI_COMMIT_API_KEY";

/// Language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// OpenAI chat completions.
    #[default]
    OpenAi,
    /// Local Ollama server.
    Ollama,
    /// OpenRouter gateway (Gemini by default).
    OpenRouter,
}

impl ProviderKind {
    /// Model used when none is configured.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => OpenAiAiClient::DEFAULT_MODEL,
            Self::Ollama => OllamaAiClient::DEFAULT_MODEL,
            Self::OpenRouter => OpenRouterAiClient::DEFAULT_MODEL,
        }
    }

    /// Environment variables that may hold this provider's API key, in
    /// lookup order. Empty when the provider needs no key.
    #[must_use]
    pub fn api_key_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY", GENERIC_API_KEY_VAR],
            Self::Ollama => &[],
            Self::OpenRouter => &["OPENROUTER_API_KEY", GENERIC_API_KEY_VAR],
        }
    }

    /// Whether requests must carry an API key.
    #[must_use]
    pub fn requires_api_key(self) -> bool {
        !self.api_key_env_vars().is_empty()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Ollama => write!(f, "Ollama"),
            Self::OpenRouter => write!(f, "OpenRouter"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "openrouter" | "gemini" => Ok(Self::OpenRouter),
            other => Err(AiError::ConfigurationError(format!(
                "Unknown provider '{other}'. Expected one of: openai, ollama, openrouter"
            ))),
        }
    }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Selected backend.
    pub provider: ProviderKind,
    /// Model override; see [`Config::model_name`].
    pub model: Option<String>,
    /// API key, if one was found.
    pub api_key: Option<String>,
    /// Base URL override for the provider endpoint.
    pub endpoint: Option<Url>,
    /// Language of the generated message.
    pub language: String,
    /// Commit type hint.
    pub commit_type: Option<String>,
    /// JSON convention rules passed through to the prompt.
    pub convention: Option<String>,
    /// Template containing `{COMMIT_MESSAGE}`.
    pub template: Option<String>,
    /// Prefix messages with a type emoji.
    pub emoji: bool,
    /// Commit without asking.
    pub force: bool,
    /// Offer several candidates.
    pub list: bool,
    /// Show the estimated fee and ask before sending.
    pub filter_fee: bool,
    /// Print the message and exit without committing.
    pub message_only: bool,
    /// Candidate count in list mode.
    pub num_options: usize,
    /// Token ceiling override.
    pub max_tokens: Option<usize>,
}

impl Config {
    /// Resolves the configuration from parsed flags, the environment and
    /// the settings file.
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self> {
        Self::resolve(cli, |key| settings.get_env_var(key))
    }

    /// Resolves the configuration using `lookup` for every non-flag value.
    pub fn resolve(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let flag = |set: bool, key: &str| set || lookup(key).is_some_and(|v| is_truthy(&v));

        let provider = match cli.provider.clone().or_else(|| lookup("PROVIDER")) {
            Some(name) => name.parse::<ProviderKind>()?,
            None => ProviderKind::default(),
        };

        let api_key = cli.api_key.clone().or_else(|| {
            provider
                .api_key_env_vars()
                .iter()
                .find_map(|&key| lookup(key))
        });

        let endpoint = cli
            .endpoint
            .clone()
            .or_else(|| lookup("ENDPOINT"))
            .map(|raw| Url::parse(&raw).with_context(|| format!("Invalid endpoint URL: {raw}")))
            .transpose()?;

        let convention = cli
            .convention
            .clone()
            .or_else(|| lookup("AI_COMMIT_CONVENTION"));
        if let Some(rules) = &convention {
            if serde_json::from_str::<serde_json::Value>(rules).is_err() {
                warn!("Convention rules are not valid JSON, passing them through unchanged");
            }
        }

        let num_options = match cli.num_options {
            Some(n) => n,
            None => lookup("AI_COMMIT_NUM_OPTIONS")
                .map(|raw| parse_count("AI_COMMIT_NUM_OPTIONS", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_NUM_OPTIONS),
        };
        if num_options == 0 {
            bail!("Number of options must be at least 1");
        }

        let max_tokens = match cli.max_tokens {
            Some(n) => Some(n),
            None => lookup("AI_COMMIT_MAX_TOKENS")
                .map(|raw| parse_count("AI_COMMIT_MAX_TOKENS", &raw))
                .transpose()?,
        };

        let config = Self {
            provider,
            model: cli.model.clone().or_else(|| lookup("MODEL")),
            api_key,
            endpoint,
            language: cli
                .language
                .clone()
                .or_else(|| lookup("AI_COMMIT_LANGUAGE"))
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            commit_type: cli
                .commit_type
                .clone()
                .or_else(|| lookup("AI_COMMIT_COMMIT_TYPE")),
            convention,
            template: cli
                .template
                .clone()
                .or_else(|| lookup("AI_COMMIT_COMMIT_TEMPLATE")),
            emoji: flag(cli.emoji, "AI_COMMIT_ADD_EMOJI"),
            force: flag(cli.force, "AI_COMMIT_FORCE"),
            list: flag(cli.list, "AI_COMMIT_LIST"),
            filter_fee: flag(cli.filter_fee, "AI_COMMIT_FILTER_FEE"),
            message_only: flag(cli.message_only, "AI_COMMIT_MESSAGE_ONLY"),
            num_options,
            max_tokens,
        };

        debug!(
            provider = %config.provider,
            model = %config.model_name(),
            list = config.list,
            "Resolved configuration"
        );
        Ok(config)
    }

    /// Configured model, or the provider's default.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))
}

/// Baseline configuration for unit tests: local provider, no key.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        provider: ProviderKind::Ollama,
        model: None,
        api_key: None,
        endpoint: None,
        language: DEFAULT_LANGUAGE.to_string(),
        commit_type: None,
        convention: None,
        template: None,
        emoji: false,
        force: false,
        list: false,
        filter_fee: false,
        message_only: false,
        num_options: DEFAULT_NUM_OPTIONS,
        max_tokens: None,
    }
}
