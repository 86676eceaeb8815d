//! Commit message templates.

use anyhow::{Context, Result};
use tracing::warn;

/// Placeholder replaced by the generated message.
pub const COMMIT_MESSAGE_PLACEHOLDER: &str = "{COMMIT_MESSAGE}";

/// Placeholder replaced by the current branch name.
pub const GIT_BRANCH_PLACEHOLDER: &str = "{GIT_BRANCH}";

/// Substitutes `message` (and the branch, if referenced) into `template`.
///
/// A template without [`COMMIT_MESSAGE_PLACEHOLDER`] is ignored with a
/// warning and the message is returned unchanged. The branch is only
/// looked up when the template contains [`GIT_BRANCH_PLACEHOLDER`].
pub fn apply_template(
    template: &str,
    message: &str,
    branch_lookup: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if !template.contains(COMMIT_MESSAGE_PLACEHOLDER) {
        warn!(
            "Commit template does not contain {COMMIT_MESSAGE_PLACEHOLDER}, using the message as is"
        );
        return Ok(message.to_string());
    }

    let mut result = template.replace(COMMIT_MESSAGE_PLACEHOLDER, message);

    if result.contains(GIT_BRANCH_PLACEHOLDER) {
        let branch = branch_lookup().context("Failed to resolve {GIT_BRANCH} in commit template")?;
        result = result.replace(GIT_BRANCH_PLACEHOLDER, &branch);
    }

    Ok(result.trim().to_string())
}
