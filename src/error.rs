//! Errors that end the commit workflow before or instead of committing.

use thiserror::Error;

/// Precondition failures and user declines.
#[derive(Error, Debug, PartialEq)]
pub enum WorkflowError {
    /// The working directory is not inside a git repository.
    #[error("This is not a git repository 🙅‍♂️")]
    NotARepository,

    /// The index has no changes against HEAD.
    #[error("No changes to commit 🙅\nMaybe you forgot to add the files? Try `git add .` and then run this command again.")]
    NothingStaged,

    /// Only lock files are staged, so there is nothing to describe.
    #[error("Nothing to analyze: only lock files are staged. Commit them with `git commit` directly.")]
    OnlyLockFiles,

    /// The user rejected the message or quit the selection.
    #[error("Commit aborted by user 🙅‍♂️")]
    AbortedByUser,

    /// The user declined the estimated API fee.
    #[error("Aborted: estimated fee of ${fee:.3} was not accepted")]
    FeeDeclined {
        /// Estimated cost in US dollars.
        fee: f64,
    },
}
