//! CLI interface for ai-commit.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::ai::create_client;
use crate::config::Config;
use crate::error::WorkflowError;
use crate::git::GitRepository;
use crate::utils::{check_ai_credentials, Settings};

pub mod interact;
pub mod workflow;

use interact::Terminal;
use workflow::CommitWorkflow;

/// ai-commit: commit messages written by a language model from your staged diff.
///
/// Every option falls back to an environment variable and then to the
/// `env` map of `~/.ai-commit/settings.json`.
#[derive(Parser, Debug, Default)]
#[command(name = "ai-commit")]
#[command(about = "Generate commit messages from the staged diff with AI", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Provider: openai, ollama or openrouter [env: PROVIDER].
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name; defaults per provider [env: MODEL].
    #[arg(long)]
    pub model: Option<String>,

    /// API key [env: OPENAI_API_KEY, OPENROUTER_API_KEY, AI_COMMIT_API_KEY].
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL of the provider API [env: ENDPOINT].
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Language of the message [env: AI_COMMIT_LANGUAGE] [default: english].
    #[arg(long)]
    pub language: Option<String>,

    /// Commit type hint, e.g. feat or fix [env: AI_COMMIT_COMMIT_TYPE].
    #[arg(long)]
    pub commit_type: Option<String>,

    /// JSON object of custom message rules [env: AI_COMMIT_CONVENTION].
    #[arg(long)]
    pub convention: Option<String>,

    /// Template containing {COMMIT_MESSAGE} and optionally {GIT_BRANCH}
    /// [env: AI_COMMIT_COMMIT_TEMPLATE].
    #[arg(long)]
    pub template: Option<String>,

    /// Prefix the message with an emoji for its type [env: AI_COMMIT_ADD_EMOJI].
    #[arg(long)]
    pub emoji: bool,

    /// Commit without asking for confirmation [env: AI_COMMIT_FORCE].
    #[arg(long)]
    pub force: bool,

    /// Offer several messages to choose from [env: AI_COMMIT_LIST].
    #[arg(long)]
    pub list: bool,

    /// Show the estimated API cost and ask before sending [env: AI_COMMIT_FILTER_FEE].
    #[arg(long)]
    pub filter_fee: bool,

    /// Print the message(s) and exit without committing [env: AI_COMMIT_MESSAGE_ONLY].
    #[arg(long)]
    pub message_only: bool,

    /// Number of messages in list mode [env: AI_COMMIT_NUM_OPTIONS] [default: 5].
    #[arg(long)]
    pub num_options: Option<usize>,

    /// Prompt token ceiling override [env: AI_COMMIT_MAX_TOKENS].
    #[arg(long)]
    pub max_tokens: Option<usize>,
}

impl Cli {
    /// Executes the commit workflow in the current directory.
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load()?;
        let config = Config::from_cli(&self, &settings)?;

        let repo = GitRepository::open().map_err(|e| {
            debug!("Repository discovery failed: {e:#}");
            WorkflowError::NotARepository
        })?;

        let ai_info = check_ai_credentials(&config)?;
        println!("🤖 AI provider: {} (model: {})", ai_info.provider, ai_info.model);

        let client = create_client(&config)?;
        let mut workflow = CommitWorkflow::new(config, client, Terminal::stdin());
        workflow.run(&repo).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "ai-commit",
            "--provider",
            "ollama",
            "--list",
            "--num-options",
            "3",
            "--commit-type",
            "fix",
            "--filter-fee",
        ]);
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(cli.list);
        assert!(cli.filter_fee);
        assert!(!cli.force);
        assert_eq!(cli.num_options, Some(3));
        assert_eq!(cli.commit_type.as_deref(), Some("fix"));
    }

    #[test]
    fn no_flags_is_valid() {
        let cli = Cli::parse_from(["ai-commit"]);
        assert!(cli.provider.is_none());
        assert!(!cli.message_only);
    }
}
