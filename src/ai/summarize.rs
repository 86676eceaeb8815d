//! Per-file summarization for diffs too large for a single prompt.
//!
//! Planning is separate from sending: the caller first builds a
//! [`SummaryPlan`], can show the fee for the planned prompts, and only
//! then runs [`summarize`]. Requests are sent one file at a time.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::ai::error::AiError;
use crate::ai::prompts::{self, PromptOptions};
use crate::ai::token_budget::TokenBudget;
use crate::ai::AiClient;
use crate::git::FileDiff;

/// One planned summary request.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Path of the summarized file.
    pub path: String,
    /// Fully rendered summary prompt.
    pub prompt: String,
}

/// Summary requests that fit the budget plus the files that did not.
#[derive(Debug, Clone, Default)]
pub struct SummaryPlan {
    /// Requests in diff order.
    pub requests: Vec<SummaryRequest>,
    /// Paths whose summary prompt exceeds the token ceiling.
    pub skipped: Vec<String>,
    /// Sum of the token counts of all planned prompts.
    pub estimated_tokens: usize,
}

/// Builds one summary prompt per file, skipping files that exceed the budget.
pub fn plan_summaries(
    files: &[FileDiff],
    opts: &PromptOptions<'_>,
    budget: &TokenBudget,
) -> SummaryPlan {
    let mut plan = SummaryPlan::default();

    for file in files {
        let prompt = prompts::diff_summary_prompt(&file.path, &file.content, opts);
        match budget.validate_prompt(&prompt) {
            Ok(estimate) => {
                debug!(
                    path = %file.path,
                    tokens = estimate.estimated_tokens,
                    "Planned summary request"
                );
                plan.estimated_tokens += estimate.estimated_tokens;
                plan.requests.push(SummaryRequest {
                    path: file.path.clone(),
                    prompt,
                });
            }
            Err(e) => {
                warn!(
                    path = %file.path,
                    bytes = file.byte_len,
                    "Skipping {}: {e}",
                    file.path
                );
                plan.skipped.push(file.path.clone());
            }
        }
    }

    plan
}

/// Sends every planned summary request and returns the summary lines.
///
/// Each line reads `- **{path}**: {summary}`. Fails with
/// [`AiError::NothingToSummarize`] when nothing was planned and with
/// [`AiError::EmptySummaries`] when every response was blank.
pub async fn summarize(client: &dyn AiClient, plan: &SummaryPlan) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(plan.requests.len());

    for request in &plan.requests {
        let response = client
            .send_request(&request.prompt)
            .await
            .with_context(|| format!("Failed to summarize {}", request.path))?;

        let summary = response.trim();
        if summary.is_empty() {
            warn!(path = %request.path, "Empty summary returned, skipping file");
            continue;
        }
        lines.push(format!("- **{}**: {summary}", request.path));
    }

    if plan.requests.is_empty() {
        return Err(AiError::NothingToSummarize {
            skipped: plan.skipped.len(),
        }
        .into());
    }
    if lines.is_empty() {
        return Err(AiError::EmptySummaries {
            files: plan.requests.len(),
        }
        .into());
    }

    Ok(lines)
}
