pub mod parse;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    #[error("Unexpected git output: {0}")]
    Parse(String),
}

/// The queries the lookup pipeline needs from the revision-control system.
///
/// `GitCli` answers them with the `git` binary; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RevisionControl: Send + Sync {
    /// Branch the remote's HEAD points at, or `None` if it can't be read.
    /// Never fails.
    async fn resolve_symbolic_head(&self, remote: &str) -> Option<String>;

    /// Earliest merge commit on the ancestry path from `source` to `target`.
    async fn find_earliest_merge_on_path(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, GitError>;

    /// Full message (subject and body) of `commit`.
    async fn commit_message(&self, commit: &str) -> Result<String, GitError>;

    /// Configured URL of `remote`, `None` when the remote has none.
    async fn remote_url(&self, remote: &str) -> Result<Option<String>, GitError>;

    /// Push or upstream remote configured for the current branch.
    async fn current_remote(&self) -> Result<Option<String>, GitError>;

    /// Full hash of the commit `rev` names.
    async fn resolve_commit(&self, rev: &str) -> Result<String, GitError>;

    /// Commit that last touched `line` (1-based) of `path`.
    async fn blame_commit(&self, path: &Path, line: u32) -> Result<String, GitError>;
}

/// `RevisionControl` over the `git` command-line tool.
///
/// Each query spawns one `git` process in `workdir` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    async fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        debug!(
            target: "pr_finder::cmd",
            ?args,
            cwd = %self.workdir.display(),
            "exec git"
        );
        Ok(cmd.output().await?)
    }

    /// Run git and return stdout, failing on a non-zero exit.
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run git where a non-zero exit means "nothing there" rather than an error.
    async fn run_optional(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(stdout).filter(|s| !s.is_empty()))
    }

    async fn config_value(&self, key: &str) -> Result<Option<String>, GitError> {
        self.run_optional(&["config", "--get", key]).await
    }
}

#[async_trait]
impl RevisionControl for GitCli {
    #[instrument(skip(self))]
    async fn resolve_symbolic_head(&self, remote: &str) -> Option<String> {
        match self.run(&["ls-remote", "--symref", remote, "HEAD"]).await {
            Ok(stdout) => {
                let branch = parse::symbolic_head(&stdout);
                debug!(?branch, "remote HEAD");
                branch
            }
            Err(e) => {
                debug!(error = %e, "could not query remote HEAD");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn find_earliest_merge_on_path(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, GitError> {
        let range = format!("{source}...{target}");
        let args: [&str; 7] = [
            "log",
            "--merges",
            "--ancestry-path",
            "--reverse",
            "--format=%H",
            &range,
            "--",
        ];
        let output = self.output(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // A target branch that doesn't exist has no merge on its path.
            if parse::is_unknown_revision(&stderr) {
                debug!(%stderr, "range does not resolve");
                return Ok(None);
            }
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr,
            });
        }
        Ok(parse::first_hash(&String::from_utf8_lossy(&output.stdout)))
    }

    #[instrument(skip(self))]
    async fn commit_message(&self, commit: &str) -> Result<String, GitError> {
        self.run(&["show", "-s", "--format=%B", commit]).await
    }

    #[instrument(skip(self))]
    async fn remote_url(&self, remote: &str) -> Result<Option<String>, GitError> {
        self.run_optional(&["remote", "get-url", remote]).await
    }

    #[instrument(skip(self))]
    async fn current_remote(&self) -> Result<Option<String>, GitError> {
        let Some(branch) = self
            .run_optional(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await?
        else {
            debug!("detached HEAD, no branch remote");
            return Ok(None);
        };

        let keys = [
            format!("branch.{branch}.pushRemote"),
            "remote.pushDefault".to_string(),
            format!("branch.{branch}.remote"),
        ];
        for key in &keys {
            if let Some(remote) = self.config_value(key).await? {
                // `branch.<b>.remote = .` means the upstream is local.
                if remote != "." {
                    debug!(%key, %remote, "found branch remote");
                    return Ok(Some(remote));
                }
            }
        }
        Ok(None)
    }

    #[instrument(skip(self))]
    async fn resolve_commit(&self, rev: &str) -> Result<String, GitError> {
        let revspec = format!("{rev}^{{commit}}");
        self.run_optional(&["rev-parse", "--verify", "--quiet", &revspec])
            .await?
            .ok_or_else(|| GitError::UnknownRevision(rev.to_string()))
    }

    #[instrument(skip(self))]
    async fn blame_commit(&self, path: &Path, line: u32) -> Result<String, GitError> {
        let range = format!("{line},{line}");
        let path = path.to_string_lossy();
        let stdout = self
            .run(&["blame", "--porcelain", "-L", &range, "--", &path])
            .await?;
        parse::blame_hash(&stdout)
            .ok_or_else(|| GitError::Parse(format!("no commit in blame output for {path}:{line}")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    pub(crate) fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args([
                "-c",
                "user.name=Test User",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit_file(dir: &Path, name: &str, contents: &str, message: &str) -> String {
        fs::write(dir.join(name), contents).unwrap();
        git(dir, &["add", name]);
        git(dir, &["commit", "-m", message]);
        git(dir, &["rev-parse", "HEAD"])
    }

    /// main: initial -> (merge of feature) -> (merge of second)
    /// Returns the repo and the feature commit hash.
    fn setup_repo_with_merges() -> (TempDir, String, String) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit_file(dir, "README.md", "# widget\n", "Initial commit");

        git(dir, &["checkout", "--quiet", "-b", "fix-bug"]);
        let feature = commit_file(dir, "fix.txt", "fix\n", "Fix the bug");

        git(dir, &["checkout", "--quiet", "main"]);
        commit_file(dir, "other.txt", "other\n", "Unrelated work on main");
        git(
            dir,
            &[
                "merge",
                "--no-ff",
                "--no-edit",
                "--quiet",
                "-m",
                "Merge pull request #17 from acme/fix-bug\n\nFix the bug",
                "fix-bug",
            ],
        );
        let first_merge = git(dir, &["rev-parse", "HEAD"]);

        git(dir, &["checkout", "--quiet", "-b", "second"]);
        commit_file(dir, "second.txt", "second\n", "Second change");
        git(dir, &["checkout", "--quiet", "main"]);
        git(
            dir,
            &[
                "merge",
                "--no-ff",
                "--no-edit",
                "--quiet",
                "-m",
                "Merge pull request #18 from acme/second",
                "second",
            ],
        );

        (temp, feature, first_merge)
    }

    #[tokio::test]
    async fn test_find_earliest_merge_on_path() {
        let (temp, feature, first_merge) = setup_repo_with_merges();
        let cli = GitCli::new(temp.path());

        let merge = cli.find_earliest_merge_on_path(&feature, "main").await.unwrap();
        assert_eq!(merge, Some(first_merge.clone()));

        let message = cli.commit_message(&first_merge).await.unwrap();
        assert!(message.starts_with("Merge pull request #17 from acme/fix-bug"));
    }

    #[tokio::test]
    async fn test_find_merge_without_merges() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let first = commit_file(dir, "a.txt", "a\n", "First");
        commit_file(dir, "b.txt", "b\n", "Second");

        let cli = GitCli::new(dir);
        let merge = cli.find_earliest_merge_on_path(&first, "main").await.unwrap();
        assert_eq!(merge, None);
    }

    #[tokio::test]
    async fn test_find_merge_towards_missing_branch_is_none() {
        let (temp, feature, _) = setup_repo_with_merges();
        let cli = GitCli::new(temp.path());

        let merge = cli
            .find_earliest_merge_on_path(&feature, "no-such-branch")
            .await
            .unwrap();
        assert_eq!(merge, None);
    }

    #[tokio::test]
    async fn test_remote_url_and_symbolic_head() {
        let (temp, _, _) = setup_repo_with_merges();
        let upstream = temp.path().to_string_lossy().to_string();
        let clone_dir = TempDir::new().unwrap();
        git(clone_dir.path(), &["clone", "--quiet", &upstream, "work"]);
        let work = clone_dir.path().join("work");

        let cli = GitCli::new(&work);
        assert_eq!(cli.remote_url("origin").await.unwrap(), Some(upstream));
        assert_eq!(cli.remote_url("nope").await.unwrap(), None);
        assert_eq!(cli.resolve_symbolic_head("origin").await.as_deref(), Some("main"));
        assert_eq!(cli.current_remote().await.unwrap().as_deref(), Some("origin"));
    }

    #[tokio::test]
    async fn test_symbolic_head_without_remote_is_none() {
        let (temp, _, _) = setup_repo_with_merges();
        let cli = GitCli::new(temp.path());
        assert_eq!(cli.resolve_symbolic_head("origin").await, None);
        assert_eq!(cli.current_remote().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_push_remote_preferred() {
        let (temp, _, _) = setup_repo_with_merges();
        let dir = temp.path();
        git(dir, &["config", "branch.main.remote", "origin"]);
        git(dir, &["config", "branch.main.pushRemote", "fork"]);

        let cli = GitCli::new(dir);
        assert_eq!(cli.current_remote().await.unwrap().as_deref(), Some("fork"));
    }

    #[tokio::test]
    async fn test_resolve_commit_and_blame() {
        let (temp, feature, _) = setup_repo_with_merges();
        let cli = GitCli::new(temp.path());

        let head = git(temp.path(), &["rev-parse", "HEAD"]);
        assert_eq!(cli.resolve_commit("main").await.unwrap(), head);
        assert!(matches!(
            cli.resolve_commit("does-not-exist").await,
            Err(GitError::UnknownRevision(_))
        ));

        let blamed = cli.blame_commit(Path::new("fix.txt"), 1).await.unwrap();
        assert_eq!(blamed, feature);
    }
}
