//! Post-processing of generated commit messages.

pub mod emoji;
pub mod template;

use anyhow::Result;

use crate::config::Config;

pub use emoji::apply_emoji;
pub use template::apply_template;

/// Splits a multi-option response into candidates.
///
/// Options are separated by `;`. Surrounding whitespace is trimmed and
/// empty options are dropped.
pub fn parse_candidates(response: &str) -> Vec<String> {
    response
        .split(';')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies the configured emoji and template to one candidate.
///
/// `branch_lookup` is only called when the template references the
/// branch name.
pub fn finalize(
    config: &Config,
    message: &str,
    branch_lookup: impl FnOnce() -> Result<String>,
) -> Result<String> {
    let message = message.trim();
    let message = if config.emoji {
        apply_emoji(message)
    } else {
        message.to_string()
    };

    match &config.template {
        Some(template) => apply_template(template, &message, branch_lookup),
        None => Ok(message),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn no_branch() -> Result<String> {
        anyhow::bail!("branch lookup not expected")
    }

    #[test]
    fn candidates_are_trimmed_and_non_empty() {
        assert_eq!(
            parse_candidates(" feat: a ;fix: b;; \n ;docs: c\n"),
            vec!["feat: a", "fix: b", "docs: c"]
        );
        assert!(parse_candidates(" ; ").is_empty());
    }

    #[test]
    fn single_response_is_one_candidate() {
        assert_eq!(parse_candidates("fix: x"), vec!["fix: x"]);
    }

    #[test]
    fn finalize_without_options_trims_only() {
        let message = finalize(&test_config(), "  fix: x\n", no_branch).unwrap();
        assert_eq!(message, "fix: x");
    }

    #[test]
    fn emoji_is_applied_before_template() {
        let config = Config {
            emoji: true,
            template: Some("[{GIT_BRANCH}] {COMMIT_MESSAGE}".to_string()),
            ..test_config()
        };
        let message = finalize(&config, "fix: x", || Ok("main".to_string())).unwrap();
        insta::assert_snapshot!(message, @"[main] 🚑 fix: x");
    }
}
