//! Prompt templates for commit message generation.
//!
//! Every prompt is built fresh from the diff (or from per-file summaries)
//! and the language, commit-type and convention options. Ollama models
//! are asked for the conventional `<type>: <subject>` form explicitly;
//! hosted models only need to be told to include the commit type.

use crate::config::ProviderKind;

const DIFF_LEAD: &str = "Write a professional git commit message based on the diff below";

const SUMMARIES_LEAD: &str =
    "Write a professional git commit message based on the per-file change summaries below";

/// Options shared by every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions<'a> {
    /// Language the message is written in.
    pub language: &'a str,
    /// Commit type hint, e.g. `feat`.
    pub commit_type: Option<&'a str>,
    /// JSON object of custom convention rules.
    pub convention: Option<&'a str>,
}

/// Prompt asking for a single commit message for `diff`.
#[must_use]
pub fn single_commit_prompt(kind: ProviderKind, diff: &str, opts: &PromptOptions<'_>) -> String {
    render(kind, DIFF_LEAD, diff, opts, None)
}

/// Prompt asking for `num_options` `;`-separated commit messages for `diff`.
#[must_use]
pub fn multiple_commits_prompt(
    kind: ProviderKind,
    diff: &str,
    opts: &PromptOptions<'_>,
    num_options: usize,
) -> String {
    render(kind, DIFF_LEAD, diff, opts, Some(num_options))
}

/// Prompt asking for a one-sentence summary of the changes to one file.
#[must_use]
pub fn diff_summary_prompt(path: &str, diff: &str, opts: &PromptOptions<'_>) -> String {
    format!(
        "Summarize the changes to {path} shown in the diff below in one short sentence in {} language. \
         Do not preface the summary with anything and use the present tense.\n\n{diff}",
        opts.language
    )
}

/// Second-stage prompt built from per-file summary lines.
///
/// `num_options` selects between the single and the multiple-option form.
#[must_use]
pub fn summaries_commit_prompt(
    kind: ProviderKind,
    summaries: &str,
    opts: &PromptOptions<'_>,
    num_options: Option<usize>,
) -> String {
    render(kind, SUMMARIES_LEAD, summaries, opts, num_options)
}

fn render(
    kind: ProviderKind,
    lead: &str,
    body: &str,
    opts: &PromptOptions<'_>,
    num_options: Option<usize>,
) -> String {
    let mut prompt = format!("{lead} in {} language", opts.language);

    match opts.commit_type {
        Some(commit_type) => prompt.push_str(&format!(" with commit type '{commit_type}'. ")),
        None => prompt.push_str(". "),
    }

    match num_options {
        Some(n) => prompt.push_str(&format!(
            "Generate {n} options separated by \";\". For each option, use"
        )),
        None => prompt.push_str("Do not preface the commit with anything, use"),
    }
    prompt.push_str(" the present tense, return the full sentence");

    if kind == ProviderKind::Ollama {
        prompt.push_str(
            " and use the conventional commits specification (<type in lowercase>: <subject>).",
        );
    } else {
        prompt.push_str(" and also the commit type.");
    }

    if let Some(convention) = opts.convention {
        prompt.push_str(&format!(
            " Additionally apply these JSON formatted rules to your response, \
             even if they contradict the rules above: {convention}"
        ));
    }

    prompt.push_str("\n\n");
    prompt.push_str(body);
    prompt
}
