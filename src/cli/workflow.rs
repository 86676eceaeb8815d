//! The generate → choose → commit loop.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::ai::prompts::{self, PromptOptions};
use crate::ai::summarize::{plan_summaries, summarize};
use crate::ai::{AiClient, AiClientMetadata, AiError, TokenBudget};
use crate::cli::interact::{Selection, Terminal};
use crate::config::Config;
use crate::error::WorkflowError;
use crate::git::{filter_lock_files, split_by_file, GitRepository};
use crate::message;

const RULE: &str = "------------------------------";

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// A commit was created with this message.
    Committed(String),
    /// Messages were printed without committing.
    Printed(Vec<String>),
}

/// Drives one invocation: read the staged diff, generate candidates,
/// let the user pick one and commit it.
pub struct CommitWorkflow {
    config: Config,
    client: Box<dyn AiClient>,
    terminal: Terminal,
}

impl CommitWorkflow {
    /// Creates a workflow over an already constructed client and terminal.
    pub fn new(config: Config, client: Box<dyn AiClient>, terminal: Terminal) -> Self {
        Self {
            config,
            client,
            terminal,
        }
    }

    /// Runs the workflow against `repo`.
    pub async fn run(&mut self, repo: &GitRepository) -> Result<WorkflowOutcome> {
        let diff = repo.staged_diff()?;
        if diff.trim().is_empty() {
            return Err(WorkflowError::NothingStaged.into());
        }

        let filtered = filter_lock_files(&diff);
        if filtered.lock_files_removed {
            println!("ℹ️  Lock file changes are committed but not analyzed for the message.");
        }
        if filtered.is_blank() {
            return Err(WorkflowError::OnlyLockFiles.into());
        }

        loop {
            let candidates = self.generate(repo, &filtered.diff).await?;

            if self.config.message_only {
                for candidate in &candidates {
                    println!("{candidate}");
                }
                return Ok(WorkflowOutcome::Printed(candidates));
            }

            let message = if self.config.list {
                match self.terminal.select(&candidates)? {
                    Selection::Commit(message) => message,
                    Selection::Regenerate => {
                        info!("Regenerating commit messages");
                        continue;
                    }
                    Selection::Abort => return Err(WorkflowError::AbortedByUser.into()),
                }
            } else {
                let message = candidates.into_iter().next().unwrap_or_default();
                let heading = if self.config.template.is_some() {
                    "Proposed Commit With Template:"
                } else {
                    "Proposed Commit:"
                };
                println!("{heading}\n{RULE}\n{message}\n{RULE}");

                if !self.config.force && !self.terminal.confirm("Do you want to continue?", true)? {
                    return Err(WorkflowError::AbortedByUser.into());
                }
                message
            };

            println!("Committing Message... 🚀");
            repo.commit(&message)?;
            println!("Commit Successful! 🎉");
            return Ok(WorkflowOutcome::Committed(message));
        }
    }

    /// Runs one generation round and returns post-processed candidates.
    async fn generate(&mut self, repo: &GitRepository, diff: &str) -> Result<Vec<String>> {
        let metadata = self.client.get_metadata();
        let budget = TokenBudget::from_metadata(&metadata);
        let num_options = self.config.list.then_some(self.config.num_options);
        let opts = prompt_options(&self.config);

        let prompt = match num_options {
            Some(n) => prompts::multiple_commits_prompt(metadata.provider, diff, &opts, n),
            None => prompts::single_commit_prompt(metadata.provider, diff, &opts),
        };
        let completions = num_options.unwrap_or(1);

        let response = match budget.validate_prompt(&prompt) {
            Ok(estimate) => {
                debug!(
                    tokens = estimate.estimated_tokens,
                    utilization_pct = estimate.utilization_pct,
                    "Prompt fits token budget"
                );
                confirm_fee(
                    &self.config,
                    &mut self.terminal,
                    &metadata,
                    estimate.estimated_tokens,
                    completions,
                )?;
                send(self.client.as_ref(), &metadata, &prompt).await?
            }
            Err(e) if matches!(e.downcast_ref::<AiError>(), Some(AiError::PromptTooLarge { .. })) => {
                info!("{e}; summarizing the diff file by file");
                self.generate_from_summaries(diff, &budget, &metadata, num_options)
                    .await?
            }
            Err(e) => return Err(e),
        };

        let raw = if num_options.is_some() {
            message::parse_candidates(&response)
        } else {
            Some(response.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .into_iter()
                .collect()
        };
        if raw.is_empty() {
            return Err(AiError::InvalidResponseFormat(
                "response contained no commit message".to_string(),
            )
            .into());
        }

        raw.iter()
            .map(|candidate| {
                message::finalize(&self.config, candidate, || repo.get_current_branch())
            })
            .collect()
    }

    async fn generate_from_summaries(
        &mut self,
        diff: &str,
        budget: &TokenBudget,
        metadata: &AiClientMetadata,
        num_options: Option<usize>,
    ) -> Result<String> {
        let opts = prompt_options(&self.config);
        let files = split_by_file(diff);
        let plan = plan_summaries(&files, &opts, budget);
        if plan.requests.is_empty() {
            return Err(AiError::NothingToSummarize {
                skipped: plan.skipped.len(),
            }
            .into());
        }

        confirm_fee(
            &self.config,
            &mut self.terminal,
            metadata,
            plan.estimated_tokens,
            plan.requests.len() + num_options.unwrap_or(1),
        )?;

        println!(
            "📚 Diff too large for one request, summarizing {} file(s)...",
            plan.requests.len()
        );
        let lines = summarize(self.client.as_ref(), &plan).await.with_context(|| {
            format!("{} request failed", metadata.provider)
        })?;

        let prompt =
            prompts::summaries_commit_prompt(metadata.provider, &lines.join("\n"), &opts, num_options);
        budget.validate_prompt(&prompt)?;
        send(self.client.as_ref(), metadata, &prompt).await
    }
}

fn prompt_options(config: &Config) -> PromptOptions<'_> {
    PromptOptions {
        language: &config.language,
        commit_type: config.commit_type.as_deref(),
        convention: config.convention.as_deref(),
    }
}

async fn send(client: &dyn AiClient, metadata: &AiClientMetadata, prompt: &str) -> Result<String> {
    client
        .send_request(prompt)
        .await
        .with_context(|| format!("{} request failed", metadata.provider))
}

/// Shows the estimated fee and asks for confirmation, if requested and
/// the provider charges.
fn confirm_fee(
    config: &Config,
    terminal: &mut Terminal,
    metadata: &AiClientMetadata,
    tokens: usize,
    completions: usize,
) -> Result<()> {
    if !config.filter_fee {
        return Ok(());
    }
    let Some(fee_model) = metadata.fee else {
        return Ok(());
    };

    let fee = fee_model.estimate(tokens, completions);
    println!("This will cost you ~${fee:.3} for using the API.");
    if terminal.confirm("Do you want to continue 💸?", true)? {
        Ok(())
    } else {
        Err(WorkflowError::FeeDeclined { fee }.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::Path;

    use git2::Repository;

    use super::*;
    use crate::ai::test_utils::ConfigurableMockAiClient;
    use crate::ai::token_budget::{FeeModel, TokenCounter};
    use crate::config::{test_config, ProviderKind};

    fn repo_with_staged(files: &[(&str, &str)]) -> (tempfile::TempDir, GitRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        let mut index = repo.index().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();

        let git = GitRepository::open_at(dir.path()).unwrap();
        (dir, git)
    }

    fn head_message(dir: &Path) -> Option<String> {
        let repo = Repository::open(dir).unwrap();
        let head = repo.head().ok()?;
        let commit = head.peel_to_commit().unwrap();
        commit.message().map(str::to_string)
    }

    fn terminal(input: &'static str) -> Terminal {
        Terminal::new(true, Box::new(io::Cursor::new(input.as_bytes())))
    }

    fn workflow(config: Config, client: ConfigurableMockAiClient, input: &'static str) -> CommitWorkflow {
        CommitWorkflow::new(config, Box::new(client), terminal(input))
    }

    fn paid_metadata() -> AiClientMetadata {
        AiClientMetadata {
            provider: ProviderKind::OpenAi,
            model: "gpt-test".to_string(),
            max_prompt_tokens: 100_000,
            fee: Some(FeeModel {
                per_1k_tokens: 0.02,
                per_completion: 0.001,
            }),
            token_counter: TokenCounter::Heuristic,
        }
    }

    #[tokio::test]
    async fn nothing_staged_is_reported() {
        let (_dir, git) = repo_with_staged(&[]);
        let client = ConfigurableMockAiClient::new(vec![]);
        let handle = client.prompt_handle();

        let err = workflow(test_config(), client, "").run(&git).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::NothingStaged)
        );
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn lock_files_only_is_distinct_error() {
        let (_dir, git) = repo_with_staged(&[
            ("package-lock.json", "{}\n"),
            ("web/yarn.lock", "# yarn\n"),
        ]);
        let client = ConfigurableMockAiClient::new(vec![]);

        let err = workflow(test_config(), client, "").run(&git).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::OnlyLockFiles)
        );
    }

    #[tokio::test]
    async fn lock_file_hunks_are_not_sent() {
        let (_dir, git) = repo_with_staged(&[
            ("package-lock.json", "{\"lockfileVersion\": 3}\n"),
            ("src/index.js", "export {};\n"),
        ]);
        let client = ConfigurableMockAiClient::new(vec![Ok("chore: init".to_string())]);
        let handle = client.prompt_handle();
        let config = Config {
            message_only: true,
            ..test_config()
        };

        workflow(config, client, "").run(&git).await.unwrap();

        let prompt = &handle.prompts()[0];
        assert!(prompt.contains("src/index.js"));
        assert!(!prompt.contains("lockfileVersion"));
    }

    #[tokio::test]
    async fn message_only_prints_without_committing() {
        let (dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("  feat: add a  \n".to_string())]);
        let config = Config {
            message_only: true,
            emoji: true,
            ..test_config()
        };

        let outcome = workflow(config, client, "").run(&git).await.unwrap();

        assert_eq!(
            outcome,
            WorkflowOutcome::Printed(vec!["✨ feat: add a".to_string()])
        );
        assert!(head_message(dir.path()).is_none());
    }

    #[tokio::test]
    async fn declined_confirmation_aborts() {
        let (dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("feat: add a".to_string())]);

        let err = workflow(test_config(), client, "n\n").run(&git).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::AbortedByUser)
        );
        assert!(head_message(dir.path()).is_none());
    }

    #[tokio::test]
    async fn confirmed_message_is_committed() {
        let (dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("feat: add a".to_string())]);

        let outcome = workflow(test_config(), client, "y\n").run(&git).await.unwrap();

        assert_eq!(outcome, WorkflowOutcome::Committed("feat: add a".to_string()));
        assert_eq!(head_message(dir.path()).unwrap().trim(), "feat: add a");
    }

    #[tokio::test]
    async fn list_mode_regenerates_then_commits_choice() {
        let (dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![
            Ok("feat: one; fix: two".to_string()),
            Ok("docs: three; chore: four".to_string()),
        ]);
        let handle = client.prompt_handle();
        let config = Config {
            list: true,
            num_options: 2,
            ..test_config()
        };

        // Option 3 is the regenerate entry.
        let outcome = workflow(config, client, "3\n2\n").run(&git).await.unwrap();

        assert_eq!(outcome, WorkflowOutcome::Committed("chore: four".to_string()));
        assert_eq!(handle.request_count(), 2);
        assert!(handle.prompts()[0].contains("Generate 2 options separated by \";\""));
        assert_eq!(head_message(dir.path()).unwrap().trim(), "chore: four");
    }

    #[tokio::test]
    async fn list_mode_quit_aborts() {
        let (_dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("feat: one; fix: two".to_string())]);
        let config = Config {
            list: true,
            ..test_config()
        };

        let err = workflow(config, client, "q\n").run(&git).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::AbortedByUser)
        );
    }

    #[tokio::test]
    async fn declined_fee_sends_nothing() {
        let (_dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![]).with_metadata(paid_metadata());
        let handle = client.prompt_handle();
        let config = Config {
            filter_fee: true,
            ..test_config()
        };

        let err = workflow(config, client, "n\n").run(&git).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::FeeDeclined { .. })
        ));
        assert_eq!(handle.request_count(), 0);
    }

    /// Two files whose combined prompt exceeds 1 200 tokens while each
    /// per-file summary prompt fits.
    fn split_path_repo() -> (tempfile::TempDir, GitRepository) {
        let a = format!("{}\n", "a".repeat(2_000));
        let b = format!("{}\n", "b".repeat(2_000));
        repo_with_staged(&[("a.txt", a.as_str()), ("b.txt", b.as_str())])
    }

    fn split_path_metadata() -> AiClientMetadata {
        AiClientMetadata {
            max_prompt_tokens: 1_200,
            ..paid_metadata()
        }
    }

    #[tokio::test]
    async fn split_path_fee_declined_sends_nothing() {
        let (_dir, git) = split_path_repo();
        let client = ConfigurableMockAiClient::new(vec![]).with_metadata(split_path_metadata());
        let handle = client.prompt_handle();
        let config = Config {
            filter_fee: true,
            force: true,
            ..test_config()
        };

        let err = workflow(config, client, "n\n").run(&git).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::FeeDeclined { .. })
        ));
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn split_path_fee_is_asked_once_and_covers_every_request() {
        let (dir, git) = split_path_repo();
        let client = ConfigurableMockAiClient::new(vec![
            Ok("Adds a.".to_string()),
            Ok("Adds b.".to_string()),
            Ok("feat: add a and b".to_string()),
        ])
        .with_metadata(split_path_metadata());
        let handle = client.prompt_handle();
        let config = Config {
            filter_fee: true,
            force: true,
            ..test_config()
        };

        // A single answer: a second fee question would read EOF and decline.
        let outcome = workflow(config, client, "y\n").run(&git).await.unwrap();

        assert_eq!(
            outcome,
            WorkflowOutcome::Committed("feat: add a and b".to_string())
        );
        let prompts = handle.prompts();
        assert_eq!(prompts.len(), 3, "two summaries plus the final request");
        assert!(prompts[0].starts_with("Summarize the changes to a.txt"));
        assert!(prompts[1].starts_with("Summarize the changes to b.txt"));
        assert!(prompts[2].contains("- **a.txt**: Adds a.\n- **b.txt**: Adds b."));
        assert_eq!(head_message(dir.path()).unwrap().trim(), "feat: add a and b");
    }

    #[tokio::test]
    async fn fee_is_not_asked_without_filter_flag() {
        let (_dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("feat: a".to_string())])
            .with_metadata(paid_metadata());
        let config = Config {
            force: true,
            ..test_config()
        };

        // No input at all: a fee question would read EOF and decline.
        let outcome = workflow(config, client, "").run(&git).await.unwrap();
        assert_eq!(outcome, WorkflowOutcome::Committed("feat: a".to_string()));
    }

    #[tokio::test]
    async fn oversized_prompt_is_rejected_without_request() {
        let big = "x".repeat(4_000);
        let (_dir, git) = repo_with_staged(&[("big.txt", big.as_str())]);
        let client = ConfigurableMockAiClient::new(vec![]).with_max_prompt_tokens(100);
        let handle = client.prompt_handle();

        let err = workflow(test_config(), client, "").run(&git).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AiError>(),
            Some(AiError::NothingToSummarize { skipped: 1 })
        ));
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn provider_errors_are_prefixed() {
        let (_dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client =
            ConfigurableMockAiClient::new(vec![Err(anyhow::anyhow!("connection refused"))]);

        let err = workflow(test_config(), client, "").run(&git).await.unwrap_err();

        assert_eq!(err.to_string(), "Ollama request failed");
        assert_eq!(err.root_cause().to_string(), "connection refused");
    }

    #[tokio::test]
    async fn empty_response_is_invalid() {
        let (_dir, git) = repo_with_staged(&[("a.txt", "a\n")]);
        let client = ConfigurableMockAiClient::new(vec![Ok("  \n".to_string())]);

        let err = workflow(test_config(), client, "").run(&git).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AiError>(),
            Some(AiError::InvalidResponseFormat(_))
        ));
    }
}
