//! Git repository operations.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use git2::{DiffFormat, DiffOptions, ErrorCode, Repository};
use tracing::debug;

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        Self::open_at(".")
    }

    /// Opens the repository containing the specified path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Returns the working directory path.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Returns the staged changes in unified patch format.
    ///
    /// Compares the HEAD tree against the index, the same content
    /// `git diff --staged` prints. On an unborn branch every staged file
    /// shows up as an addition.
    pub fn staged_diff(&self) -> Result<String> {
        let head_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree().context("Failed to peel HEAD to tree")?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(e).context("Failed to get HEAD reference"),
        };

        let mut options = DiffOptions::new();
        options.context_lines(3);

        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut options))
            .context("Failed to diff HEAD against the index")?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .context("Failed to render staged diff")?;

        debug!(diff_len = text.len(), "Collected staged diff");
        Ok(text)
    }

    /// Returns the current branch name, like `git branch --show-current`.
    ///
    /// An unborn branch still reports its name. A detached HEAD yields an
    /// empty string.
    pub fn get_current_branch(&self) -> Result<String> {
        let head = self
            .repo
            .find_reference("HEAD")
            .context("Failed to get HEAD reference")?;

        let branch = head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .unwrap_or_default();

        if branch.is_empty() {
            debug!("HEAD is detached, branch name is empty");
        }
        Ok(branch.to_string())
    }

    /// Creates a commit from the staged changes, passing `message` to
    /// `git commit -F -` on stdin so hooks and signing settings apply.
    pub fn commit(&self, message: &str) -> Result<()> {
        let workdir = self
            .workdir()
            .map(PathBuf::from)
            .context("Cannot commit in a bare repository")?;

        let mut child = Command::new("git")
            .arg("-C")
            .arg(&workdir)
            .args(["commit", "-F", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to run git commit")?;

        child
            .stdin
            .take()
            .context("Failed to open git commit stdin")?
            .write_all(message.as_bytes())
            .context("Failed to pass commit message to git")?;

        let output = child
            .wait_with_output()
            .context("Failed to wait for git commit")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            anyhow::bail!(
                "git commit failed: {}",
                if stderr.trim().is_empty() {
                    stdout.trim()
                } else {
                    stderr.trim()
                }
            );
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        (dir, repo)
    }

    fn stage(repo: &Repository, dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn open_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitRepository::open_at(dir.path()).err().unwrap();
        assert!(err.to_string().contains("Not in a git repository"));
    }

    #[test]
    fn staged_diff_empty_when_nothing_staged() {
        let (dir, _repo) = init_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();
        assert_eq!(git.staged_diff().unwrap(), "");
    }

    #[test]
    fn staged_diff_on_unborn_branch_shows_additions() {
        let (dir, repo) = init_repo();
        stage(&repo, dir.path(), "src/a.js", "console.log('a');\n");

        let git = GitRepository::open_at(dir.path()).unwrap();
        let diff = git.staged_diff().unwrap();
        assert!(diff.starts_with("diff --git a/src/a.js b/src/a.js\n"));
        assert!(diff.contains("+console.log('a');\n"));
    }

    #[test]
    fn staged_diff_ignores_unstaged_changes() {
        let (dir, repo) = init_repo();
        stage(&repo, dir.path(), "a.txt", "one\n");
        fs::write(dir.path().join("b.txt"), "untracked\n").unwrap();

        let git = GitRepository::open_at(dir.path()).unwrap();
        let diff = git.staged_diff().unwrap();
        assert!(diff.contains("a.txt"));
        assert!(!diff.contains("b.txt"));
    }

    #[test]
    fn unborn_branch_reports_its_name() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init_opts(
            dir.path(),
            git2::RepositoryInitOptions::new().initial_head("develop"),
        )
        .unwrap();

        let git = GitRepository::open_at(dir.path()).unwrap();
        assert_eq!(git.get_current_branch().unwrap(), "develop");
    }

    #[test]
    fn detached_head_reports_empty_branch() {
        let (dir, repo) = init_repo();
        stage(&repo, dir.path(), "a.txt", "one\n");
        let signature = git2::Signature::now("Test User", "test@example.com").unwrap();
        let tree = repo.find_tree(repo.index().unwrap().write_tree().unwrap()).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, "init", &tree, &[])
            .unwrap();
        repo.set_head_detached(oid).unwrap();

        let git = GitRepository::open_at(dir.path()).unwrap();
        assert_eq!(git.get_current_branch().unwrap(), "");
    }
}
